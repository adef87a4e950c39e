use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Stdio;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn malformed_broker_uri_is_fatal() {
    Command::cargo_bin("sensor-gateway")
        .unwrap()
        .args(["--bind", "127.0.0.1:0", "--mqtt", "::not a uri"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid broker uri"));
}

#[test]
fn broker_uri_without_host_is_fatal() {
    Command::cargo_bin("sensor-gateway")
        .unwrap()
        .args(["--bind", "127.0.0.1:0", "--mqtt", "mailto:nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no host"));
}

#[test]
fn mqtt_flag_is_required() {
    Command::cargo_bin("sensor-gateway")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mqtt"));
}

#[test]
fn unreachable_broker_is_fatal_after_connect_timeout() {
    // порт 1 на loopback: соединение отклоняется сразу, ждём окно в 1 секунду
    Command::cargo_bin("sensor-gateway")
        .unwrap()
        .args([
            "--bind",
            "127.0.0.1:0",
            "--mqtt",
            "tcp://127.0.0.1:1",
            "--connect-timeout-s",
            "1",
        ])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not reachable"));
}

#[test]
fn clients_are_served_while_broker_is_awaited() {
    // свободный порт: занимаем и сразу отпускаем
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let child = std::process::Command::new(cargo_bin("sensor-gateway"))
        .args([
            "--bind",
            &addr.to_string(),
            "--mqtt",
            "tcp://127.0.0.1:1",
            "--connect-timeout-s",
            "5",
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(3);
    let mut stream = loop {
        match TcpStream::connect(addr) {
            Ok(s) => break s,
            Err(_) if Instant::now() < deadline => thread::sleep(Duration::from_millis(50)),
            Err(e) => panic!("gateway did not start listening: {e}"),
        }
    };
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    stream.write_all(b"get\n").unwrap();
    let mut line = String::new();
    BufReader::new(&stream).read_line(&mut line).unwrap();
    assert!(line.starts_with("0 000 0000 "), "{line:?}");

    // окно ожидания брокера истекает - процесс выходит с ошибкой
    let out = child.wait_with_output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not reachable"));
}
