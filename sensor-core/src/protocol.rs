use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::constants::{ACK_PREFIX, FETCH_PREFIX};

// цифра, два "слова" и непустой хвост из любых байт; \w здесь только ASCII
static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9] [0-9A-Za-z_]+ [0-9A-Za-z_]+ (?-u:.)+").expect("command regex is valid")
});

/// Что клиент прислал одной строкой
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Строка начинается с `get`: отдать последнее показание
    Fetch,
    /// Команда вида `"5 set light on"`, требует подтверждения challenge-кодом.
    /// Байты строки как есть, без перевода строки.
    Command(Vec<u8>),
    /// Всё остальное
    Unknown,
}

/// Проверяет форму команды: `"<digit> <word> <word> <anything>"`.
///
/// Совпадение ищется в любом месте строки, содержимое токенов не проверяется.
/// Хвост может содержать произвольные байты, не только UTF-8.
pub fn is_command_request(line: &[u8]) -> bool {
    COMMAND_RE.is_match(line)
}

/// Классифицирует строку клиента. Перевод строки в конце отбрасывается.
pub fn classify(line: &[u8]) -> Request {
    let line = strip_terminator(line);

    if line.starts_with(FETCH_PREFIX.as_bytes()) {
        Request::Fetch
    } else if is_command_request(line) {
        Request::Command(line.to_vec())
    } else {
        Request::Unknown
    }
}

/// Ответ на подтверждённую команду: `"ACK <command>\n"`, байт в байт.
pub fn format_ack(command: &[u8]) -> Vec<u8> {
    let command = strip_terminator(command);

    let mut out = Vec::with_capacity(ACK_PREFIX.len() + command.len() + 1);
    out.extend_from_slice(ACK_PREFIX.as_bytes());
    out.extend_from_slice(command);
    out.push(b'\n');
    out
}

/// Убирает ровно один `\n` или `\r\n` в конце строки.
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_shape_is_recognized() {
        assert!(is_command_request(b"5 abc def rest of message"));
        assert!(is_command_request(b"5 abc def ghi"));
        assert!(is_command_request(b"5 set light on\n"));
    }

    #[test]
    fn non_commands_are_rejected() {
        assert!(!is_command_request(b"get"));
        assert!(!is_command_request(b"hello"));
        assert!(!is_command_request(b"nospacesatall"));
        assert!(!is_command_request(b"5 abc def "));
        assert!(!is_command_request(b"x abc def ghi"));
        assert!(!is_command_request(b"5 a-b def ghi"));
    }

    #[test]
    fn word_characters_are_ascii_only() {
        assert!(!is_command_request("5 свет def ghi".as_bytes()));
    }

    #[test]
    fn tail_may_hold_any_bytes() {
        assert!(is_command_request(b"5 set name \xe9"));
        assert!(is_command_request(b"5 set name caf\xe9\xff"));
    }

    #[test]
    fn classify_prefers_fetch() {
        assert_eq!(classify(b"get\n"), Request::Fetch);
        assert_eq!(classify(b"get"), Request::Fetch);
        // достаточно префикса
        assert_eq!(classify(b"getaway"), Request::Fetch);
    }

    #[test]
    fn classify_command_drops_terminator() {
        assert_eq!(
            classify(b"5 set light on\r\n"),
            Request::Command(b"5 set light on".to_vec())
        );
    }

    #[test]
    fn classify_command_keeps_raw_bytes() {
        assert_eq!(
            classify(b"5 set name caf\xe9\n"),
            Request::Command(b"5 set name caf\xe9".to_vec())
        );
    }

    #[test]
    fn classify_unknown() {
        assert_eq!(classify(b"banana\n"), Request::Unknown);
        assert_eq!(classify(b"\n"), Request::Unknown);
        assert_eq!(classify(b" get"), Request::Unknown);
    }

    #[test]
    fn ack_has_single_newline() {
        assert_eq!(format_ack(b"5 set light on"), b"ACK 5 set light on\n");
        assert_eq!(format_ack(b"5 set light on\n"), b"ACK 5 set light on\n");
    }

    #[test]
    fn ack_echoes_non_utf8_bytes() {
        assert_eq!(format_ack(b"5 set name caf\xe9"), b"ACK 5 set name caf\xe9\n");
    }

    #[test]
    fn strip_terminator_removes_one_line_ending() {
        assert_eq!(strip_terminator(b"abc\r\n"), b"abc");
        assert_eq!(strip_terminator(b"abc\n"), b"abc");
        assert_eq!(strip_terminator(b"abc\n\n"), b"abc\n");
        assert_eq!(strip_terminator(b"abc"), b"abc");
    }
}
