// Parsers for the text output of pactl and SwitchAudioSource.
//
// Parsing never fails: anything unrecognised is skipped, and garbage or
// empty input produces an empty list. `index` is the 0-based position in
// the accepted output, so indices are always contiguous.
use crate::source::{AudioSource, AudioSourceList};

/// Raw listing formats understood by [`SourceFormat::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `pactl list short sources`: `<index>\t<name>\t<driver>...`
    LineTable,
    /// `pactl list sources`: `Source #N` headers followed by tab-indented
    /// `Name:` / `Description:` lines.
    Blocks,
    /// `SwitchAudioSource -a -t input`: one device name per line.
    NameList,
}

impl SourceFormat {
    pub fn parse(&self, raw: &str) -> AudioSourceList {
        let sources = match self {
            SourceFormat::LineTable => parse_line_table(raw),
            SourceFormat::Blocks => parse_blocks(raw),
            SourceFormat::NameList => parse_name_list(raw),
        };
        sources.filter_monitors()
    }
}

fn parse_line_table(raw: &str) -> AudioSourceList {
    let mut sources = Vec::new();
    for line in raw.lines() {
        if line.to_lowercase().contains("monitor") {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 {
            continue;
        }
        let name = fields[1].trim();
        if name.is_empty() {
            continue;
        }
        sources.push(AudioSource::new(name, sources.len()));
    }
    AudioSourceList::new(sources)
}

#[derive(Default)]
struct PendingBlock {
    name: Option<String>,
    description: Option<String>,
}

fn parse_blocks(raw: &str) -> AudioSourceList {
    let mut sources = Vec::new();
    let mut pending: Option<PendingBlock> = None;

    for line in raw.lines() {
        let line = line.trim_end();
        if is_block_header(line) {
            flush_block(pending.take(), &mut sources);
            pending = Some(PendingBlock::default());
            continue;
        }
        let Some(block) = pending.as_mut() else {
            continue;
        };
        if let Some(value) = line.strip_prefix("\tName: ") {
            block.name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("\tDescription: ") {
            block.description = Some(value.trim().to_string());
        }
    }
    flush_block(pending, &mut sources);

    AudioSourceList::new(sources)
}

/// `Source #<N>` with at least one digit after the `#`.
fn is_block_header(line: &str) -> bool {
    line.strip_prefix("Source #")
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

fn flush_block(block: Option<PendingBlock>, sources: &mut Vec<AudioSource>) {
    let Some(block) = block else {
        return;
    };
    let Some(name) = block.name.filter(|name| !name.is_empty()) else {
        return;
    };
    let source = AudioSource::new(name, sources.len())
        .with_description(block.description.unwrap_or_default());
    if !source.is_monitor() {
        sources.push(source);
    }
}

fn parse_name_list(raw: &str) -> AudioSourceList {
    let mut sources = Vec::new();
    for line in raw.lines() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        let source = AudioSource::new(name, sources.len());
        if !source.is_monitor() {
            sources.push(source);
        }
    }
    AudioSourceList::new(sources)
}

/// Stream ids from `pactl list short source-outputs`. A line contributes an
/// id only when its first tab-separated field is a non-negative integer.
pub fn parse_stream_ids(raw: &str) -> Vec<u32> {
    raw.lines()
        .filter_map(|line| {
            let field = line.split('\t').next()?.trim();
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            field.parse().ok()
        })
        .collect()
}
