//! Wire vocabulary: the server→client message catalog and guess parsing.
//!
//! Every message is a single newline-terminated ASCII line. Clients send
//! one decimal guess per message; anything that does not parse as a
//! number is treated as the guess 0, never rejected.

/// Upper bound on a single read from a player socket.
pub const MAX_BUFFER: usize = 1024;

pub fn welcome(id: u32) -> String {
    format!("Welcome to the game, your id is {}\n", id)
}

pub fn player_joined(id: u32) -> String {
    format!("Player {} joined the game\n", id)
}

pub fn player_disconnected(id: u32) -> String {
    format!("Player {} disconnected\n", id)
}

pub fn player_guessed(id: u32, guess: i32) -> String {
    format!("Player {} guessed {}\n", id, guess)
}

pub fn too_high(guess: i32) -> String {
    format!("The guess {} is too high\n", guess)
}

pub fn too_low(guess: i32) -> String {
    format!("The guess {} is too low\n", guess)
}

pub fn player_wins(id: u32) -> String {
    format!("Player {} wins\n", id)
}

pub fn reveal(target: i32) -> String {
    format!("The correct guessing is {}\n", target)
}

/// Parses a guess with `atoi` semantics: optional leading ASCII
/// whitespace, optional sign, then leading decimal digits. No digits
/// parses to 0; values outside the i32 range saturate.
pub fn parse_guess(data: &[u8]) -> i32 {
    let mut i = 0;
    while i < data.len() && data[i].is_ascii_whitespace() {
        i += 1;
    }

    let mut sign: i64 = 1;
    if i < data.len() && (data[i] == b'+' || data[i] == b'-') {
        if data[i] == b'-' {
            sign = -1;
        }
        i += 1;
    }

    let mut value: i64 = 0;
    while i < data.len() && data[i].is_ascii_digit() {
        value = value * 10 + (data[i] - b'0') as i64;
        if value > i32::MAX as i64 + 1 {
            // Already past either i32 bound; further digits cannot matter.
            value = i32::MAX as i64 + 1;
            break;
        }
        i += 1;
    }

    (sign * value).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
