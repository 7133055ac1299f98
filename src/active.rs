/// Active-frame data as it arrives from a source document.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveFrames {
    Number(f64),
    Text(String),
    List(Vec<f64>),
}

/// Integral values print without a fraction, like frame counts in the game.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub fn format_active(active: Option<&ActiveFrames>) -> String {
    match active {
        None => "-".to_string(),
        Some(ActiveFrames::Number(n)) if n.is_finite() => format_number(*n),
        Some(ActiveFrames::Number(_)) => "-".to_string(),
        Some(ActiveFrames::Text(s)) if s.trim().is_empty() => "-".to_string(),
        Some(ActiveFrames::Text(s)) => s.trim().to_string(),
        Some(ActiveFrames::List(frames)) => format_active_frames(frames),
    }
}

/// Pairs read as `[start, end]` only when each is ascending and no two of
/// them overlap or touch; `[5, 6, 7, 8]` is one run of frames, not two windows.
fn as_intervals(frames: &[f64]) -> Option<Vec<f64>> {
    if frames.len() < 2 || frames.len() % 2 != 0 {
        return None;
    }
    let pairs: Vec<(f64, f64)> = frames.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    if pairs.iter().any(|(start, end)| end < start) {
        return None;
    }
    let mut sorted = pairs.clone();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    if sorted.windows(2).any(|w| w[0].1 + 1.0 >= w[1].0) {
        return None;
    }
    Some(pairs.iter().map(|(start, end)| end - start + 1.0).collect())
}

fn as_runs(frames: &[f64]) -> Vec<f64> {
    let mut sorted = frames.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut runs = vec![];
    let (mut start, mut prev) = (sorted[0], sorted[0]);
    for &cur in &sorted[1..] {
        if cur == prev + 1.0 {
            prev = cur;
            continue;
        }
        runs.push(prev - start + 1.0);
        start = cur;
        prev = cur;
    }
    runs.push(prev - start + 1.0);
    runs
}

/// Compresses a frame list into comma-separated window lengths.
///
/// An even-length list of ascending, separated pairs is read as inclusive
/// `[start, end]` intervals, so `[6, 9]` is one 4-frame window. Anything
/// else is a set of discrete frames, sorted and merged into consecutive runs.
/// Non-finite entries are ignored; an empty list gives `"-"`.
pub fn format_active_frames(frames: &[f64]) -> String {
    let frames: Vec<f64> = frames.iter().copied().filter(|x| x.is_finite()).collect();
    if frames.is_empty() {
        return "-".to_string();
    }
    let lengths = as_intervals(&frames).unwrap_or_else(|| as_runs(&frames));
    lengths
        .into_iter()
        .map(format_number)
        .collect::<Vec<_>>()
        .join(", ")
}
