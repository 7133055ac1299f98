use std::fmt;

use log::debug;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::{char, satisfy, space0},
    combinator::{all_consuming, opt},
    sequence::{delimited, preceded},
};

/// How direction digits are shown. Motion, charge and hold rendering is the
/// same in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Directional,
    Numeric,
}

/// Suffix marking a held direction or button, rendered in parentheses.
pub const CHARGE_LABEL: &str = "蓄";

/// Numpad convention, 1 (down-back) through 9 (up-forward).
const DIRECTION_GLYPHS: [(char, char); 9] = [
    ('1', '↙'),
    ('2', '↓'),
    ('3', '↘'),
    ('4', '←'),
    ('5', '•'),
    ('6', '→'),
    ('7', '↖'),
    ('8', '↑'),
    ('9', '↗'),
];

/// Older combo notes stored neutral as a middle dot.
const LEGACY_NEUTRAL_GLYPH: char = '·';

pub fn is_direction_digit(c: char) -> bool {
    ('1'..='9').contains(&c)
}

pub fn digit_to_glyph(c: char) -> Option<char> {
    DIRECTION_GLYPHS.iter().find(|(d, _)| *d == c).map(|(_, g)| *g)
}

pub fn glyph_to_digit(c: char) -> Option<char> {
    if c == LEGACY_NEUTRAL_GLYPH {
        return Some('5');
    }
    DIRECTION_GLYPHS.iter().find(|(_, g)| *g == c).map(|(d, _)| *d)
}

pub fn digits_to_glyphs(s: &str) -> String {
    s.chars().map(|c| digit_to_glyph(c).unwrap_or(c)).collect()
}

pub fn glyphs_to_digits(s: &str) -> String {
    s.chars().map(|c| glyph_to_digit(c).unwrap_or(c)).collect()
}

fn render_directions(digits: &str, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Directional => digits_to_glyphs(digits),
        DisplayMode::Numeric => digits.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limb {
    Punch,
    Kick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Ppp,
    Kkk,
    Pp,
    Kk,
    Lp,
    Mp,
    Hp,
    Lk,
    Mk,
    Hk,
    P,
    K,
}

impl Button {
    /// Matching order: three letters, then two, then one.
    pub const LONGEST_FIRST: [Button; 12] = [
        Button::Ppp,
        Button::Kkk,
        Button::Pp,
        Button::Kk,
        Button::Lp,
        Button::Mp,
        Button::Hp,
        Button::Lk,
        Button::Mk,
        Button::Hk,
        Button::P,
        Button::K,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Button::Ppp => "ppp",
            Button::Kkk => "kkk",
            Button::Pp => "pp",
            Button::Kk => "kk",
            Button::Lp => "lp",
            Button::Mp => "mp",
            Button::Hp => "hp",
            Button::Lk => "lk",
            Button::Mk => "mk",
            Button::Hk => "hk",
            Button::P => "p",
            Button::K => "k",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Button::Ppp => "PPP",
            Button::Kkk => "KKK",
            Button::Pp => "PP",
            Button::Kk => "KK",
            Button::Lp => "LP",
            Button::Mp => "MP",
            Button::Hp => "HP",
            Button::Lk => "LK",
            Button::Mk => "MK",
            Button::Hk => "HK",
            Button::P => "P",
            Button::K => "K",
        }
    }

    /// Exact, case-insensitive lookup of a whole token.
    pub fn from_code(s: &str) -> Option<Button> {
        Button::LONGEST_FIRST
            .into_iter()
            .find(|b| b.code().eq_ignore_ascii_case(s))
    }

    /// Longest button code at the start of `s`, case-insensitive.
    pub fn match_prefix(s: &str) -> Option<Button> {
        Button::LONGEST_FIRST.into_iter().find(|b| {
            let n = b.code().len();
            s.len() >= n && s.is_char_boundary(n) && s[..n].eq_ignore_ascii_case(b.code())
        })
    }

    /// Only the six single strength+limb buttons have one.
    pub fn strength_limb(self) -> Option<(Strength, Limb)> {
        match self {
            Button::Lp => Some((Strength::Light, Limb::Punch)),
            Button::Mp => Some((Strength::Medium, Limb::Punch)),
            Button::Hp => Some((Strength::Heavy, Limb::Punch)),
            Button::Lk => Some((Strength::Light, Limb::Kick)),
            Button::Mk => Some((Strength::Medium, Limb::Kick)),
            Button::Hk => Some((Strength::Heavy, Limb::Kick)),
            _ => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Splits a run of letters into button tokens, longest match first.
/// Returns `None` if any part of the run is not a button.
pub fn parse_buttons(run: &str) -> Option<Vec<Button>> {
    let mut rest = run;
    let mut buttons = vec![];
    while !rest.is_empty() {
        let button = Button::match_prefix(rest)?;
        buttons.push(button);
        rest = &rest[button.code().len()..];
    }
    Some(buttons)
}

fn push_button_run(out: &mut String, run: &str) {
    match parse_buttons(run) {
        Some(buttons) => buttons.iter().for_each(|b| out.push_str(b.label())),
        None => out.push_str(&run.to_uppercase()),
    }
}

/// Uppercases every letter run, keeping separators such as `+` as they are.
pub fn format_buttons(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = String::new();
    for c in s.chars() {
        if c.is_ascii_alphabetic() {
            run.push(c);
            continue;
        }
        if !run.is_empty() {
            push_button_run(&mut out, &run);
            run.clear();
        }
        out.push(c);
    }
    if !run.is_empty() {
        push_button_run(&mut out, &run);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk<'a> {
    Cyclic {
        lead: &'a str,
        spin: &'a str,
        buttons: Option<&'a str>,
    },
    Held {
        dirs: &'a str,
        button: &'a str,
    },
    Charge {
        from: &'a str,
        to: &'a str,
        buttons: Option<&'a str>,
    },
    Pressed {
        dirs: &'a str,
        buttons: &'a str,
    },
    Jump {
        buttons: &'a str,
    },
    Plain {
        dirs: Option<&'a str>,
        buttons: Option<&'a str>,
    },
}

fn direction_run(input: &str) -> IResult<&str, &str> {
    take_while1(is_direction_digit).parse(input)
}

fn single_direction(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, 1, is_direction_digit).parse(input)
}

fn button_letters(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphabetic()).parse(input)
}

fn parenthesized(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_while1(|c: char| c != ')'), char(')')).parse(input)
}

fn plus_buttons(input: &str) -> IResult<&str, &str> {
    preceded((space0, char('+'), space0), button_letters).parse(input)
}

fn button_suffix(input: &str) -> IResult<&str, &str> {
    alt((parenthesized, plus_buttons, button_letters)).parse(input)
}

fn parser_cyclic(input: &str) -> IResult<&str, Chunk<'_>> {
    (
        opt(direction_run),
        delimited(char('{'), alt((tag("360"), tag("720"))), char('}')),
        opt(button_suffix),
    )
        .map(|(lead, spin, buttons)| Chunk::Cyclic {
            lead: lead.unwrap_or_default(),
            spin,
            buttons,
        })
        .parse(input)
}

fn parser_held_with_direction(input: &str) -> IResult<&str, Chunk<'_>> {
    alt((
        (direction_run, delimited(char('['), button_letters, char(']'))),
        delimited(char('['), (single_direction, button_letters), char(']')),
    ))
    .map(|(dirs, button)| Chunk::Held { dirs, button })
    .parse(input)
}

fn parser_held_button(input: &str) -> IResult<&str, Chunk<'_>> {
    delimited(char('['), button_letters, char(']'))
        .map(|button| Chunk::Held { dirs: "", button })
        .parse(input)
}

fn parser_charge(input: &str) -> IResult<&str, Chunk<'_>> {
    (
        delimited(char('['), single_direction, char(']')),
        opt(char('>')),
        direction_run,
        opt(button_suffix),
    )
        .map(|(from, _, to, buttons)| Chunk::Charge { from, to, buttons })
        .parse(input)
}

fn parser_pressed(input: &str) -> IResult<&str, Chunk<'_>> {
    (direction_run, parenthesized)
        .map(|(dirs, buttons)| Chunk::Pressed { dirs, buttons })
        .parse(input)
}

fn parser_jump(input: &str) -> IResult<&str, Chunk<'_>> {
    preceded(
        (satisfy(|c| c == 'j' || c == 'J'), opt(char('.'))),
        button_letters,
    )
    .map(|buttons| Chunk::Jump { buttons })
    .parse(input)
}

fn parser_plain(input: &str) -> IResult<&str, Chunk<'_>> {
    (opt(direction_run), opt(alt((plus_buttons, button_letters))))
        .map(|(dirs, buttons)| Chunk::Plain { dirs, buttons })
        .parse(input)
}

fn parse_chunk(input: &str) -> Option<Chunk<'_>> {
    all_consuming(alt((
        parser_cyclic,
        parser_held_with_direction,
        parser_held_button,
        parser_charge,
        parser_pressed,
        parser_jump,
        parser_plain,
    )))
    .parse(input)
    .ok()
    .map(|(_, chunk)| chunk)
}

fn render_chunk(chunk: &Chunk<'_>, mode: DisplayMode) -> String {
    match *chunk {
        Chunk::Cyclic { lead, spin, buttons } => {
            let mut out = render_directions(lead, mode);
            out.push_str(spin);
            if let Some(buttons) = buttons {
                out.push_str(" + ");
                out.push_str(&format_buttons(buttons));
            }
            out
        }
        Chunk::Held { dirs: "", button } => {
            format!("{}({})", format_buttons(button), CHARGE_LABEL)
        }
        Chunk::Held { dirs, button } => format!(
            "{} + {}({})",
            render_directions(dirs, mode),
            format_buttons(button),
            CHARGE_LABEL
        ),
        Chunk::Charge { from, to, buttons } => {
            let mut out = format!(
                "{}({}){}",
                render_directions(from, mode),
                CHARGE_LABEL,
                render_directions(to, mode)
            );
            if let Some(buttons) = buttons {
                out.push_str(" + ");
                out.push_str(&format_buttons(buttons));
            }
            out
        }
        Chunk::Pressed { dirs, buttons } => format!(
            "{} + {}",
            render_directions(dirs, mode),
            format_buttons(buttons)
        ),
        Chunk::Jump { buttons } => format!("J.{}", format_buttons(buttons)),
        Chunk::Plain { dirs, buttons } => {
            let dirs = dirs.unwrap_or_default();
            let buttons = buttons.map(format_buttons).unwrap_or_default();
            match (dirs.chars().count(), buttons.is_empty()) {
                (_, true) => render_directions(dirs, mode),
                (0, false) => buttons,
                (1, false) => format!("{}{}", render_directions(dirs, mode), buttons),
                (_, false) => format!("{} + {}", render_directions(dirs, mode), buttons),
            }
        }
    }
}

/// Shape-agnostic rendering: glyph substitution plus button uppercasing.
fn render_fallback(chunk: &str, mode: DisplayMode) -> String {
    let chunk = chunk.replace("{360}", "360").replace("{720}", "720");
    let mut out = String::with_capacity(chunk.len());
    let mut run = String::new();
    for c in chunk.chars() {
        if c.is_ascii_alphabetic() {
            run.push(c);
            continue;
        }
        if !run.is_empty() {
            push_button_run(&mut out, &run);
            run.clear();
        }
        match (mode, digit_to_glyph(c)) {
            (DisplayMode::Directional, Some(glyph)) => out.push(glyph),
            _ => out.push(c),
        }
    }
    if !run.is_empty() {
        push_button_run(&mut out, &run);
    }
    out
}

fn format_chunk(chunk: &str, mode: DisplayMode) -> String {
    let cleaned: String = chunk.chars().filter(|&c| c != '*').collect();
    let cleaned = cleaned.trim();
    match parse_chunk(cleaned) {
        Some(parsed) => render_chunk(&parsed, mode),
        None => {
            debug!("Notation chunk {:?} has no known shape", cleaned);
            render_fallback(cleaned, mode)
        }
    }
}

fn is_charge_head(piece: &str) -> bool {
    let piece: String = piece.chars().filter(|&c| c != '*').collect();
    let piece = piece.trim();
    let mut chars = piece.chars();
    matches!(
        (chars.next(), chars.next(), chars.next(), chars.next()),
        (Some('['), Some(d), Some(']'), None) if is_direction_digit(d)
    )
}

/// Splits a target-combo chain on `>`, keeping `[4]>6` charge motions whole.
fn split_chunks(raw: &str) -> Vec<String> {
    let mut chunks: Vec<String> = vec![];
    let mut pending: Option<String> = None;
    for piece in raw.split('>') {
        match pending.take() {
            Some(head) => chunks.push(format!("{}>{}", head, piece)),
            None if is_charge_head(piece) => pending = Some(piece.to_string()),
            None => chunks.push(piece.to_string()),
        }
    }
    if let Some(head) = pending {
        chunks.push(head);
    }
    chunks
}

/// Renders raw notation for display. Input written with direction glyphs is
/// accepted as well as digits.
pub fn format_input(raw: &str, mode: DisplayMode) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "-".to_string();
    }
    let raw = glyphs_to_digits(raw);
    split_chunks(&raw)
        .iter()
        .map(|chunk| format_chunk(chunk, mode))
        .collect::<Vec<_>>()
        .join(">")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Jump,
    Direction(char),
}

/// A single stance or direction plus one strength+limb button, e.g. `5lp`,
/// `2mk`, `j.hp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleNormal {
    pub stance: Stance,
    pub button: Button,
}

fn parser_simple_normal(input: &str) -> IResult<&str, (Stance, &str)> {
    (
        alt((
            char('j').map(|_| Stance::Jump),
            satisfy(is_direction_digit).map(Stance::Direction),
        )),
        button_letters,
    )
        .parse(input)
}

/// `.` and `>` after a jump are tolerated, as is whitespace anywhere.
pub fn parse_simple_normal(input: &str) -> Option<SimpleNormal> {
    let normalized: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | '>') && !c.is_whitespace())
        .collect();
    let (_, (stance, code)) = all_consuming(parser_simple_normal)
        .parse(normalized.as_str())
        .ok()?;
    let button = Button::from_code(code)?;
    button.strength_limb()?;
    Some(SimpleNormal { stance, button })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(raw: &str) -> String {
        format_input(raw, DisplayMode::Directional)
    }

    fn num(raw: &str) -> String {
        format_input(raw, DisplayMode::Numeric)
    }

    #[test]
    fn glyph_round_trip() {
        for s in ["1", "236", "41236", "623", "214214", "987654321", "5"] {
            assert_eq!(glyphs_to_digits(&digits_to_glyphs(s)), s);
        }
        assert_eq!(glyphs_to_digits("·"), "5");
    }

    #[test]
    fn motion_with_button_gets_separator() {
        assert_eq!(dir("236mp"), "↓↘→ + MP");
        assert_eq!(dir("623+hp"), "→↓↘ + HP");
        assert_eq!(num("236mp"), "236 + MP");
    }

    #[test]
    fn single_direction_normal_has_no_separator() {
        assert_eq!(dir("5hp"), "•HP");
        assert_eq!(dir("2mk"), "↓MK");
        assert_eq!(num("5hp"), "5HP");
    }

    #[test]
    fn buttons_only_and_directions_only() {
        assert_eq!(dir("pp"), "PP");
        assert_eq!(dir("66"), "→→");
        assert_eq!(num("66"), "66");
    }

    #[test]
    fn charge_motion() {
        assert_eq!(dir("[4]>6hp"), "←(蓄)→ + HP");
        assert_eq!(dir("[2]8k"), "↓(蓄)↑ + K");
        assert_eq!(num("[4]>6"), "4(蓄)6");
    }

    #[test]
    fn button_holds() {
        assert_eq!(dir("2[mk]"), "↓ + MK(蓄)");
        assert_eq!(dir("[2mk]"), "↓ + MK(蓄)");
        assert_eq!(dir("[hp]"), "HP(蓄)");
    }

    #[test]
    fn cyclic_motions() {
        assert_eq!(dir("{360}+p"), "360 + P");
        assert_eq!(dir("{720}(kk)"), "720 + KK");
        assert_eq!(dir("{360}"), "360");
    }

    #[test]
    fn parenthesized_buttons() {
        assert_eq!(dir("236(lp+lk)"), "↓↘→ + LP+LK");
        assert_eq!(num("214(pp)"), "214 + PP");
    }

    #[test]
    fn target_combo_chain() {
        assert_eq!(dir("5lp>5mp>5hp"), "•LP>•MP>•HP");
        assert_eq!(dir("j.hp>2mk"), "J.HP>↓MK");
    }

    #[test]
    fn wildcards_are_stripped() {
        assert_eq!(dir("*2hp"), "↓HP");
        assert_eq!(dir("[4*]6p"), "←(蓄)→ + P");
    }

    #[test]
    fn glyph_input_is_accepted() {
        assert_eq!(dir("↓↘→mp"), "↓↘→ + MP");
        assert_eq!(num("↓↘→mp"), "236 + MP");
    }

    #[test]
    fn empty_input() {
        assert_eq!(dir(""), "-");
        assert_eq!(dir("   "), "-");
    }

    #[test]
    fn unknown_shapes_fall_back() {
        assert_eq!(dir("66 or 44"), "→→ OR ←←");
        assert_eq!(dir("2lp~mp"), "↓LP~MP");
    }

    #[test]
    fn output_never_keeps_lowercase_buttons() {
        for code in ["lp", "mp", "hp", "lk", "mk", "hk", "p", "k", "pp", "kk", "ppp", "kkk"] {
            for raw in [format!("5{code}"), format!("236{code}"), format!("[4]6{code}")] {
                let out = dir(&raw);
                assert!(out.contains(&code.to_uppercase()), "{raw} -> {out}");
                assert!(!out.contains(code), "{raw} -> {out}");
            }
        }
    }

    #[test]
    fn longest_button_match() {
        assert_eq!(parse_buttons("ppp"), Some(vec![Button::Ppp]));
        assert_eq!(parse_buttons("lpp"), Some(vec![Button::Lp, Button::P]));
        assert_eq!(parse_buttons("xyz"), None);
        assert_eq!(format_buttons("lp+lk"), "LP+LK");
    }

    #[test]
    fn simple_normals() {
        assert_eq!(
            parse_simple_normal("5lp"),
            Some(SimpleNormal { stance: Stance::Direction('5'), button: Button::Lp })
        );
        assert_eq!(
            parse_simple_normal("J.HP"),
            Some(SimpleNormal { stance: Stance::Jump, button: Button::Hp })
        );
        assert_eq!(
            parse_simple_normal("j>hk").map(|n| n.stance),
            Some(Stance::Jump)
        );
        assert_eq!(parse_simple_normal("5pp"), None);
        assert_eq!(parse_simple_normal("236p"), None);
        assert_eq!(parse_simple_normal("5lplk"), None);
    }
}
