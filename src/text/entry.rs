//! # Entry Formatting
//!
//! Turns structured directory records into streams of measured boxes.
//! A [`Token`] carries one run of text in one font role plus a break
//! penalty; [`pack`] folds tokens into an entry's box list, merging
//! adjacent same-role joins so ligatures and kerning apply across them.

use serde::Deserialize;

use crate::error::FoldoutError;
use crate::font::{FontEncoder, FontRole, FontSet};
use crate::text::TextBox;

/// One word or punctuation run, ready to pack into an entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub text: String,
    pub role: FontRole,
    /// Negative joins this token to the previous box with no space.
    /// Zero is an ordinary breakable space; positive discourages the
    /// break before this token by that weight.
    #[serde(default)]
    pub penalty: i32,
}

impl Token {
    pub fn new(text: impl Into<String>, role: FontRole, penalty: i32) -> Self {
        Token {
            text: text.into(),
            role,
            penalty,
        }
    }
}

/// A directory record: one household and its members.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Family {
    pub surname: String,
    pub phone: String,
    pub email: String,
    pub people: Vec<Person>,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Fold one token onto the end of an entry's box list.
pub fn pack(
    boxes: &mut Vec<TextBox>,
    token: &Token,
    fonts: &FontSet,
    enc: &mut FontEncoder,
) -> Result<(), FoldoutError> {
    if boxes.is_empty() {
        boxes.push(fonts.make_box(token.role, &token.text, 1.0, enc)?);
        return Ok(());
    }

    let last = boxes.len() - 1;
    if token.penalty < 0 && boxes[last].role == token.role {
        // Remeasure the concatenation so ligatures and kerning form
        // across the seam.
        let mut combined = boxes[last].text.clone();
        combined.push_str(&token.text);
        let mut merged = fonts.make_box(token.role, &combined, 1.0, enc)?;
        merged.penalty = boxes[last].penalty;
        boxes[last] = merged;
    } else if token.penalty < 0 {
        boxes[last].join_next = true;
        boxes.push(fonts.make_box(token.role, &token.text, 1.0, enc)?);
    } else {
        boxes[last].penalty = token.penalty;
        boxes.push(fonts.make_box(token.role, &token.text, 1.0, enc)?);
    }
    Ok(())
}

/// Measure every entry's tokens into box lists. Empty input or an empty
/// entry is rejected; downstream breaking has no sensible answer for
/// either.
pub fn format_entries(
    entries: &[Vec<Token>],
    fonts: &FontSet,
    enc: &mut FontEncoder,
) -> Result<Vec<Vec<TextBox>>, FoldoutError> {
    if entries.is_empty() {
        return Err(FoldoutError::DegenerateLayout(
            "no entries to lay out".into(),
        ));
    }
    let mut out = Vec::with_capacity(entries.len());
    for (n, tokens) in entries.iter().enumerate() {
        if tokens.is_empty() {
            return Err(FoldoutError::DegenerateLayout(format!(
                "entry {n} has no tokens"
            )));
        }
        let mut boxes = Vec::new();
        for token in tokens {
            pack(&mut boxes, token, fonts, enc)?;
        }
        out.push(boxes);
    }
    Ok(out)
}

/// Render one family record into the token stream its entry is built
/// from: surname in the emphasis face, contacts and members in the body
/// face, email addresses in the fixed-pitch face.
pub fn family_tokens(family: &Family) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut needcomma = false;

    // Breaking inside a surname is strongly discouraged.
    for (i, word) in family.surname.split_whitespace().enumerate() {
        let penalty = if i > 0 { 2 } else { 0 };
        tokens.push(Token::new(word, FontRole::Emphasis, penalty));
    }

    if !family.phone.is_empty() {
        if needcomma {
            tokens.push(Token::new(",", FontRole::Body, -1));
        }
        tokens.push(Token::new(&family.phone, FontRole::Body, 0));
        needcomma = true;
    }

    if !family.email.is_empty() {
        if needcomma {
            tokens.push(Token::new(",", FontRole::Body, -1));
        }
        tokens.push(Token::new(&family.email, FontRole::Mono, 0));
        needcomma = true;
    }

    for person in &family.people {
        if needcomma {
            tokens.push(Token::new(",", FontRole::Body, -1));
            needcomma = false;
        }

        for (i, word) in person.name.split_whitespace().enumerate() {
            let penalty = if i > 0 { 2 } else { 0 };
            tokens.push(Token::new(word, FontRole::Body, penalty));
        }

        if person.phone.is_empty() && person.email.is_empty() {
            needcomma = true;
            continue;
        }

        // Personal contact details sit in parentheses after the name.
        tokens.push(Token::new("(", FontRole::Body, 1));

        if !person.phone.is_empty() {
            tokens.push(Token::new(&person.phone, FontRole::Body, -1));
            needcomma = true;
        }

        if !person.email.is_empty() {
            let penalty = if needcomma {
                tokens.push(Token::new(",", FontRole::Body, -1));
                1
            } else {
                -1
            };
            tokens.push(Token::new(&person.email, FontRole::Mono, penalty));
        }

        tokens.push(Token::new(")", FontRole::Body, -1));
        needcomma = true;
    }

    if !family.address.is_empty() {
        if needcomma {
            tokens.push(Token::new(",", FontRole::Body, -1));
        }
        let words: Vec<&str> = family.address.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            // Discourage breaks inside the address except after a comma.
            let penalty = if i > 0 && !words[i - 1].ends_with(',') {
                2
            } else {
                0
            };
            tokens.push(Token::new(*word, FontRole::Body, penalty));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testutil::small_font_set;

    #[test]
    fn test_same_role_join_equals_direct_measurement() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();

        let mut boxes = Vec::new();
        pack(
            &mut boxes,
            &Token::new("fee", FontRole::Body, 0),
            &fonts,
            &mut enc,
        )
        .unwrap();
        pack(
            &mut boxes,
            &Token::new(",", FontRole::Body, -1),
            &fonts,
            &mut enc,
        )
        .unwrap();

        let direct = fonts
            .make_box(FontRole::Body, "fee,", 1.0, &mut enc)
            .unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].text, direct.text);
        assert_eq!(boxes[0].width, direct.width);
        assert_eq!(boxes[0].command, direct.command);
    }

    #[test]
    fn test_cross_role_join_flags_the_left_box() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();

        let mut boxes = Vec::new();
        pack(
            &mut boxes,
            &Token::new("fee", FontRole::Body, 0),
            &fonts,
            &mut enc,
        )
        .unwrap();
        pack(
            &mut boxes,
            &Token::new("off", FontRole::Mono, -1),
            &fonts,
            &mut enc,
        )
        .unwrap();

        assert_eq!(boxes.len(), 2);
        assert!(boxes[0].join_next);
        assert!(!boxes[1].join_next);
        assert_eq!(boxes[1].role, FontRole::Mono);
    }

    #[test]
    fn test_positive_penalty_lands_on_the_previous_box() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();

        let mut boxes = Vec::new();
        pack(
            &mut boxes,
            &Token::new("if", FontRole::Body, 0),
            &fonts,
            &mut enc,
        )
        .unwrap();
        pack(
            &mut boxes,
            &Token::new("of", FontRole::Body, 2),
            &fonts,
            &mut enc,
        )
        .unwrap();

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].penalty, 2);
        assert_eq!(boxes[1].penalty, 0);
    }

    #[test]
    fn test_family_token_stream_shape() {
        let family = Family {
            surname: "Van Alen".into(),
            phone: "555-0100".into(),
            email: "home@example.com".into(),
            people: vec![
                Person {
                    name: "Ada".into(),
                    phone: "555-0101".into(),
                    email: "ada@example.com".into(),
                },
                Person {
                    name: "Ben".into(),
                    ..Person::default()
                },
            ],
            address: "12 Fifth Ave, Anytown".into(),
        };

        let tokens = family_tokens(&family);

        // Surname words: first unpenalized, rest strongly held together.
        assert_eq!(tokens[0], Token::new("Van", FontRole::Emphasis, 0));
        assert_eq!(tokens[1], Token::new("Alen", FontRole::Emphasis, 2));
        // Family phone, then a joined comma before the family email.
        assert_eq!(tokens[2], Token::new("555-0100", FontRole::Body, 0));
        assert_eq!(tokens[3], Token::new(",", FontRole::Body, -1));
        assert_eq!(tokens[4].role, FontRole::Mono);

        // Ada's contacts sit inside parentheses, comma-joined.
        let open = tokens.iter().position(|t| t.text == "(").unwrap();
        assert_eq!(tokens[open].penalty, 1);
        assert_eq!(tokens[open + 1], Token::new("555-0101", FontRole::Body, -1));
        assert_eq!(tokens[open + 2], Token::new(",", FontRole::Body, -1));
        assert_eq!(
            tokens[open + 3],
            Token::new("ada@example.com", FontRole::Mono, 1)
        );
        assert_eq!(tokens[open + 4], Token::new(")", FontRole::Body, -1));

        // Address words hold together except after a comma.
        let ave = tokens.iter().position(|t| t.text == "Ave,").unwrap();
        assert_eq!(tokens[ave].penalty, 2);
        assert_eq!(tokens[ave + 1], Token::new("Anytown", FontRole::Body, 0));
    }

    #[test]
    fn test_format_entries_rejects_empty_input() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        assert!(format_entries(&[], &fonts, &mut enc).is_err());
        assert!(format_entries(&[vec![]], &fonts, &mut enc).is_err());
    }
}
