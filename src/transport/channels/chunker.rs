//! Lossless splitting of outgoing text under a per-message character limit.
//!
//! Text is cut only between words, except inside a single word longer than
//! the limit. Among splittings with the fewest chunks, the one whose cut
//! points sit on the strongest boundaries (paragraph, line, sentence, word)
//! wins.

/// Strength of a cut point; higher is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    Hard = 0,
    Word = 1,
    Sentence = 2,
    Line = 3,
    Paragraph = 4,
}

impl Boundary {
    fn score(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct Cut {
    byte: usize,
    chars: usize,
    kind: Boundary,
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Byte ranges of words, each carrying its trailing whitespace.
fn units(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = false;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_space = true;
        } else if in_space {
            out.push((start, idx));
            start = idx;
            in_space = false;
        }
    }
    if start < text.len() {
        out.push((start, text.len()));
    }
    out
}

fn classify(unit: &str) -> Boundary {
    let word = unit.trim_end();
    let gap = &unit[word.len()..];
    let newlines = gap.matches('\n').count();
    if newlines >= 2 {
        Boundary::Paragraph
    } else if newlines == 1 {
        Boundary::Line
    } else if word.ends_with(['.', '!', '?', '…']) && !gap.is_empty() {
        Boundary::Sentence
    } else if !gap.is_empty() {
        Boundary::Word
    } else {
        Boundary::Hard
    }
}

/// Every admissible cut point, in order, starting with the origin.
fn cut_points(text: &str, max_chars: usize) -> Vec<Cut> {
    let mut cuts = vec![Cut {
        byte: 0,
        chars: 0,
        kind: Boundary::Hard,
    }];
    let mut chars_before = 0;

    for (start, end) in units(text) {
        let unit = &text[start..end];
        let unit_chars = char_count(unit);

        if unit_chars > max_chars {
            // Overlong word: any character boundary may end a chunk.
            for (offset, (byte_offset, _)) in unit.char_indices().enumerate().skip(1) {
                cuts.push(Cut {
                    byte: start + byte_offset,
                    chars: chars_before + offset,
                    kind: Boundary::Hard,
                });
            }
        }

        chars_before += unit_chars;
        cuts.push(Cut {
            byte: end,
            chars: chars_before,
            kind: classify(unit),
        });
    }
    cuts
}

#[derive(Debug, Clone, Copy)]
struct Best {
    chunks: usize,
    score: usize,
    prev: usize,
}

impl Best {
    fn beats(self, other: Option<Self>) -> bool {
        match other {
            None => true,
            Some(other) => {
                self.chunks < other.chunks
                    || (self.chunks == other.chunks && self.score > other.score)
            }
        }
    }
}

/// Split `text` into chunks of at most `max_chars` characters whose
/// concatenation is exactly `text`.
#[must_use]
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }
    if char_count(text) <= max_chars {
        return vec![text.to_string()];
    }

    let cuts = cut_points(text, max_chars);
    let last = cuts.len() - 1;
    let mut best: Vec<Option<Best>> = vec![None; cuts.len()];
    best[0] = Some(Best {
        chunks: 0,
        score: 0,
        prev: 0,
    });

    for i in 1..cuts.len() {
        let gain = if i == last { 0 } else { cuts[i].kind.score() };
        for j in (0..i).rev() {
            if cuts[i].chars - cuts[j].chars > max_chars {
                break;
            }
            let Some(from) = best[j] else {
                continue;
            };
            let candidate = Best {
                chunks: from.chunks + 1,
                score: from.score + gain,
                prev: j,
            };
            if candidate.beats(best[i]) {
                best[i] = Some(candidate);
            }
        }
    }

    let mut bounds = Vec::new();
    let mut at = last;
    while at > 0 {
        let Some(step) = best[at] else {
            break;
        };
        bounds.push((cuts[step.prev].byte, cuts[at].byte));
        at = step.prev;
    }
    bounds.reverse();

    bounds
        .into_iter()
        .map(|(start, end)| text[start..end].to_string())
        .collect()
}
