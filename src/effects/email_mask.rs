//! Scrambles the email field as it is typed: each newly typed character is
//! swapped for a random alphanumeric one, separators (`@`, `.`) excepted.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement};

use crate::config::EmailConfig;
use crate::error::EffectError;
use crate::utils::dom::Listener;

pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const SEPARATORS: [char; 2] = ['@', '.'];

fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

pub fn random_character<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())])
}

#[derive(Debug)]
pub struct EmailMask<R> {
    previous: String,
    rng: R,
}

impl<R: Rng> EmailMask<R> {
    pub fn new(rng: R) -> Self {
        Self {
            previous: String::new(),
            rng,
        }
    }

    pub fn previous(&self) -> &str {
        &self.previous
    }

    /// Handle one `input` event. Returns the value the field must be set to,
    /// or `None` when the field is left as the user typed it.
    ///
    /// Growth is judged by UTF-16 length only, the way the field reports it,
    /// so a paste or a mid-string insert is treated like typing and just the
    /// final character is replaced.
    pub fn on_input(&mut self, current: &str) -> Option<String> {
        let grew = utf16_len(current) > utf16_len(&self.previous);
        let last = current.chars().last();

        let replacement = match last {
            Some(last) if grew && !SEPARATORS.contains(&last) => {
                let mut masked = String::with_capacity(current.len());
                masked.push_str(&current[..current.len() - last.len_utf8()]);
                masked.push(random_character(&mut self.rng));
                Some(masked)
            }
            _ => None,
        };

        self.previous = replacement.clone().unwrap_or_else(|| current.to_string());
        replacement
    }
}

pub struct EmailMaskHandle {
    _listener: Listener,
}

pub fn install(
    document: &Document,
    config: &EmailConfig,
) -> Result<Option<EmailMaskHandle>, EffectError> {
    let input = document
        .get_element_by_id(&config.input_id)
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok());
    let Some(input) = input else {
        log::debug!("No #{} input, email mask disabled", config.input_id);
        return Ok(None);
    };

    let mut mask = EmailMask::new(StdRng::from_entropy());

    let target = input.clone();
    let listener = Listener::new(&target, "input", move |_| {
        let current = input.value();
        if let Some(masked) = mask.on_input(&current) {
            input.set_value(&masked);
        }
    })?;

    Ok(Some(EmailMaskHandle {
        _listener: listener,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask() -> EmailMask<StdRng> {
        EmailMask::new(StdRng::seed_from_u64(7))
    }

    fn is_alphanumeric(c: char) -> bool {
        c.is_ascii() && ALPHABET.contains(&(c as u8))
    }

    /// Type `text` one character at a time, the way the browser reports it.
    fn type_text(mask: &mut EmailMask<StdRng>, text: &str) -> String {
        let mut field = mask.previous().to_string();
        for c in text.chars() {
            field.push(c);
            if let Some(masked) = mask.on_input(&field) {
                field = masked;
            }
        }
        field
    }

    #[test]
    fn alphabet_is_62_alphanumerics() {
        assert_eq!(ALPHABET.len(), 62);
        assert!(ALPHABET.iter().all(|b| b.is_ascii_alphanumeric()));
        let mut sorted = ALPHABET.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 62);
    }

    #[test]
    fn random_character_covers_alphabet() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5_000 {
            let c = random_character(&mut rng);
            assert!(is_alphanumeric(c));
            seen.insert(c);
        }
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn single_keystroke_becomes_one_random_character() {
        let mut mask = mask();
        let masked = mask.on_input("a").expect("typed character is replaced");
        assert_eq!(masked.chars().count(), 1);
        assert!(is_alphanumeric(masked.chars().next().unwrap()));
        assert_eq!(mask.previous(), masked);
    }

    #[test]
    fn separators_are_kept() {
        let mut mask = mask();
        let field = type_text(&mut mask, "user@");

        assert_eq!(field.chars().count(), 5);
        assert!(field.ends_with('@'));
        assert!(field[..4].chars().all(is_alphanumeric));
        assert_eq!(mask.previous(), field);

        let field = type_text(&mut mask, "mail.");
        assert!(field.ends_with('.'));
        assert_eq!(field.matches('@').count(), 1);
    }

    #[test]
    fn earlier_characters_are_not_touched_again() {
        let mut mask = mask();
        let first = type_text(&mut mask, "ab");
        let second = type_text(&mut mask, "c");
        assert_eq!(second[..2], first[..]);
    }

    #[test]
    fn deletion_never_randomizes() {
        let mut mask = mask();
        let field = type_text(&mut mask, "abc@d");

        let mut shorter = field.clone();
        shorter.pop();
        assert_eq!(mask.on_input(&shorter), None);
        assert_eq!(mask.previous(), shorter);

        assert_eq!(mask.on_input(""), None);
        assert_eq!(mask.previous(), "");
    }

    #[test]
    fn same_length_replacement_is_committed_as_is() {
        let mut mask = mask();
        type_text(&mut mask, "xy");
        assert_eq!(mask.on_input("zz"), None);
        assert_eq!(mask.previous(), "zz");
    }

    #[test]
    fn fresh_mask_starts_from_empty_baseline() {
        let mut mask = mask();
        assert_eq!(mask.previous(), "");

        let masked = mask.on_input("ab").expect("growth from empty is masked");
        assert!(masked.starts_with('a'));
        assert_eq!(masked.chars().count(), 2);
        assert!(is_alphanumeric(masked.chars().last().unwrap()));
    }

    #[test]
    fn growth_is_measured_in_utf16_units() {
        let mut mask = mask();
        let field = type_text(&mut mask, "abc");
        let first = field.chars().next().unwrap();

        // Two characters replaced by one astral character: 3 units either way.
        let edited = format!("{}😀", first);
        assert_eq!(mask.on_input(&edited), None);
        assert_eq!(mask.previous(), edited);

        // 3 units again, so nothing grew even though there is one more char.
        let retyped = format!("{}ab", first);
        assert_eq!(mask.on_input(&retyped), None);
        assert_eq!(mask.previous(), retyped);
    }

    #[test]
    fn paste_only_masks_final_character() {
        let mut mask = mask();
        let masked = mask.on_input("pasted").unwrap();
        assert!(masked.starts_with("paste"));
        assert_eq!(masked.len(), 6);
    }

    #[test]
    fn multibyte_final_character_is_replaced_whole() {
        let mut mask = mask();
        let masked = mask.on_input("né").unwrap();
        assert!(masked.starts_with('n'));
        assert_eq!(masked.chars().count(), 2);
        assert!(masked.is_ascii());
    }
}
