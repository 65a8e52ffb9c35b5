//! Local asset file (`{game_id}-User.txt`)
//!
//! The first line holds the format version and the second the game title.
//! Every following line is one record:
//!
//! ```text
//! 111000001:"0xH001234=7":"Title":"Description"::::author:10:::::00000
//! L111000002:"start":"cancel":"submit":"value":SCORE:"Title":"Description":1
//! ```
//!
//! Fields are separated by `:`. Quoted fields may contain `:` and use `\"`
//! and `\\` as escapes. Records that are not touched are written back
//! exactly as they were read.

use super::{Asset, AssetBody, AssetKind, Category, LeaderboardSlots};
use crate::codec::{serialize_trigger, serialize_value, ParseError, TriggerParser};
use crate::error::{Error, Result};
use crate::requirements::Trigger;
use std::fs;
use std::path::{Path, PathBuf};

/// Version written to new files
pub const DEFAULT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq)]
enum Record {
    /// `raw` is dropped once the asset is modified
    Parsed { asset: Asset, raw: Option<String> },
    /// Blank or unreadable line, kept as-is
    Verbatim(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnding {
    Lf,
    CrLf,
    /// Last line of a file without a final newline
    Eof,
}

impl LineEnding {
    fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Eof => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    record: Record,
    ending: LineEnding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalAssetFile {
    pub game_id: u32,
    pub version: String,
    title: String,
    version_ending: LineEnding,
    title_ending: LineEnding,
    records: Vec<Line>,
    /// Ending used where a line gains a successor it did not have
    newline: LineEnding,
}

impl LocalAssetFile {
    /// Empty file for `game_id`
    pub fn new(game_id: u32) -> Self {
        Self {
            game_id,
            version: DEFAULT_VERSION.to_string(),
            title: String::new(),
            version_ending: LineEnding::Lf,
            title_ending: LineEnding::Lf,
            records: Vec::new(),
            newline: LineEnding::Lf,
        }
    }

    /// Conventional file location inside a data directory
    pub fn path_for<P: AsRef<Path>>(dir: P, game_id: u32) -> PathBuf {
        dir.as_ref().join(format!("{}-User.txt", game_id))
    }

    /// Parse file text, collecting an error for every unreadable record
    ///
    /// Each line keeps its own terminator, so files with mixed endings are
    /// written back unchanged.
    pub fn parse(game_id: u32, text: &str) -> (Self, Vec<ParseError>) {
        let mut file = Self::new(game_id);
        let mut lines = split_lines(text);

        if let Some((version, ending)) = lines.next() {
            file.version = version.to_string();
            file.version_ending = ending;
            file.title_ending = ending;
        }
        if let Some((title, ending)) = lines.next() {
            file.title = title.to_string();
            file.title_ending = ending;
        }
        file.newline = [file.version_ending, file.title_ending]
            .into_iter()
            .find(|ending| *ending != LineEnding::Eof)
            .unwrap_or(LineEnding::Lf);

        let mut errors = Vec::new();
        for (index, (line, ending)) in lines.enumerate() {
            let line_no = index + 3;
            let record = if line.trim().is_empty() {
                Record::Verbatim(line.to_string())
            } else {
                match parse_record(line, line_no) {
                    Ok(asset) => Record::Parsed {
                        asset,
                        raw: Some(line.to_string()),
                    },
                    Err(e) => {
                        log::warn!("Skipping unreadable record in {}-User.txt: {}", game_id, e);
                        errors.push(e);
                        Record::Verbatim(line.to_string())
                    }
                }
            };
            file.records.push(Line { record, ending });
        }

        (file, errors)
    }

    /// Parse file text, failing on the first unreadable record
    pub fn parse_strict(game_id: u32, text: &str) -> Result<Self> {
        let (file, errors) = Self::parse(game_id, text);
        match errors.into_iter().next() {
            Some(e) => Err(Error::InvalidRecord {
                line: e.line,
                message: e.report(),
            }),
            None => Ok(file),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, game_id: u32) -> Result<(Self, Vec<ParseError>)> {
        let text = fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded local assets from {}", path.as_ref().display());
        Ok(Self::parse(game_id, &text))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_text())?;
        log::debug!("Saved local assets to {}", path.as_ref().display());
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Every readable asset, in file order
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.records.iter().filter_map(|line| match &line.record {
            Record::Parsed { asset, .. } => Some(asset),
            Record::Verbatim(_) => None,
        })
    }

    pub fn assets_of_kind(&self, kind: AssetKind) -> Vec<Asset> {
        self.assets().filter(|a| a.kind() == kind).cloned().collect()
    }

    pub fn get(&self, kind: AssetKind, id: u32) -> Option<&Asset> {
        self.assets().find(|a| a.kind() == kind && a.id == id)
    }

    pub fn len(&self) -> usize {
        self.assets().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the record with the same kind and id, or append a new one
    ///
    /// An unreadable line carrying the same id is replaced as well.
    pub fn upsert(&mut self, asset: &Asset, author: &str) {
        let mut updated = asset.clone();
        updated.author = author.to_string();
        updated.category = Category::Local;

        let prefix = match updated.kind() {
            AssetKind::Achievement => format!("{}:", updated.id),
            AssetKind::Leaderboard => format!("L{}:", updated.id),
        };
        let existing = self.records.iter_mut().find(|line| match &line.record {
            Record::Parsed { asset: current, .. } => {
                current.kind() == updated.kind() && current.id == updated.id
            }
            Record::Verbatim(text) => text.starts_with(&prefix),
        });

        let record = Record::Parsed {
            asset: updated,
            raw: None,
        };
        match existing {
            Some(line) => {
                if let Record::Verbatim(text) = &line.record {
                    log::warn!("Replacing unreadable record: {}", text);
                }
                line.record = record;
            }
            None => {
                let ending = self
                    .records
                    .last()
                    .map_or(self.title_ending, |line| line.ending);
                self.records.push(Line { record, ending });
            }
        }
    }

    pub fn to_text(&self) -> String {
        let mut lines = vec![
            (self.version.clone(), self.version_ending),
            (self.title.clone(), self.title_ending),
        ];
        for line in &self.records {
            let content = match &line.record {
                Record::Parsed { raw: Some(raw), .. } => raw.clone(),
                Record::Parsed { asset, raw: None } => write_record(asset),
                Record::Verbatim(text) => text.clone(),
            };
            lines.push((content, line.ending));
        }

        let last = lines.len() - 1;
        let mut text = String::new();
        for (index, (content, ending)) in lines.into_iter().enumerate() {
            text.push_str(&content);
            match ending {
                LineEnding::Eof if index < last => text.push_str(self.newline.as_str()),
                _ => text.push_str(ending.as_str()),
            }
        }
        text
    }
}

/// Split into lines, keeping each line's terminator
fn split_lines(text: &str) -> impl Iterator<Item = (&str, LineEnding)> {
    text.split_inclusive('\n').map(|line| {
        if let Some(content) = line.strip_suffix("\r\n") {
            (content, LineEnding::CrLf)
        } else if let Some(content) = line.strip_suffix('\n') {
            (content, LineEnding::Lf)
        } else {
            (line, LineEnding::Eof)
        }
    })
}

// ============================================================================
// Record parsing
// ============================================================================

struct Field {
    text: String,
    /// 1-based column of the first character of the field content
    column: usize,
}

fn split_fields(line: &str, line_no: usize) -> std::result::Result<Vec<Field>, ParseError> {
    let chars: Vec<char> = line.chars().collect();
    let mut fields = Vec::new();
    let mut pos = 0;

    loop {
        if chars.get(pos) == Some(&'"') {
            let column = pos + 2;
            pos += 1;

            let mut text = String::new();
            loop {
                match chars.get(pos) {
                    None => {
                        return Err(ParseError::new(
                            "Unterminated quoted field",
                            line_no,
                            column - 1,
                        ))
                    }
                    Some('\\') if matches!(chars.get(pos + 1), Some('"') | Some('\\')) => {
                        text.push(chars[pos + 1]);
                        pos += 2;
                    }
                    Some('"') => {
                        pos += 1;
                        break;
                    }
                    Some(c) => {
                        text.push(*c);
                        pos += 1;
                    }
                }
            }
            fields.push(Field { text, column });

            match chars.get(pos) {
                None => break,
                Some(':') => pos += 1,
                Some(c) => {
                    return Err(ParseError::new(
                        format!("Expected ':' after quoted field, found '{}'", c),
                        line_no,
                        pos + 1,
                    ))
                }
            }
        } else {
            let end = chars[pos..]
                .iter()
                .position(|c| *c == ':')
                .map_or(chars.len(), |offset| pos + offset);
            fields.push(Field {
                text: chars[pos..end].iter().collect(),
                column: pos + 1,
            });
            if end == chars.len() {
                break;
            }
            pos = end + 1;
        }
    }

    Ok(fields)
}

fn parse_record(line: &str, line_no: usize) -> std::result::Result<Asset, ParseError> {
    let fields = split_fields(line, line_no)?;
    if fields[0].text.starts_with('L') {
        parse_leaderboard(&fields, line_no)
    } else {
        parse_achievement(&fields, line_no)
    }
}

fn require_fields(fields: &[Field], count: usize, line_no: usize) -> std::result::Result<(), ParseError> {
    if fields.len() < count {
        return Err(ParseError::new(
            format!("Expected at least {} fields, found {}", count, fields.len()),
            line_no,
            1,
        ));
    }
    Ok(())
}

fn text(fields: &[Field], index: usize) -> String {
    fields.get(index).map(|f| f.text.clone()).unwrap_or_default()
}

fn parse_number(text: &str, what: &str, line_no: usize, column: usize) -> std::result::Result<u32, ParseError> {
    text.parse()
        .map_err(|_| ParseError::new(format!("Invalid {} '{}'", what, text), line_no, column))
}

fn parse_slot(
    field: &Field,
    value: bool,
    line_no: usize,
    context: &str,
) -> std::result::Result<Trigger, ParseError> {
    let mut parser = TriggerParser::with_origin(&field.text, line_no, field.column);
    if value {
        parser = parser.value_mode();
    }
    parser
        .parse_trigger()
        .map_err(|e| ParseError::wrap(format!("Invalid trigger for {}", context), line_no, 1, e))
}

fn parse_achievement(fields: &[Field], line_no: usize) -> std::result::Result<Asset, ParseError> {
    require_fields(fields, 3, line_no)?;
    let id = parse_number(&fields[0].text, "id", line_no, fields[0].column)?;
    let trigger = parse_slot(&fields[1], false, line_no, &format!("achievement {}", id))?;

    let points = match fields.get(8) {
        Some(field) if !field.text.is_empty() => {
            parse_number(&field.text, "points", line_no, field.column)?
        }
        _ => 0,
    };

    let mut asset = Asset::achievement(text(fields, 2), trigger)
        .with_id(id)
        .with_description(text(fields, 3))
        .with_points(points)
        .with_badge(text(fields, 13));
    asset.author = text(fields, 7);
    Ok(asset)
}

fn parse_leaderboard(fields: &[Field], line_no: usize) -> std::result::Result<Asset, ParseError> {
    require_fields(fields, 5, line_no)?;
    let id = parse_number(&fields[0].text[1..], "id", line_no, fields[0].column + 1)?;
    let context = format!("leaderboard {}", id);

    let slots = LeaderboardSlots {
        start: parse_slot(&fields[1], false, line_no, &context)?,
        cancel: parse_slot(&fields[2], false, line_no, &context)?,
        submit: parse_slot(&fields[3], false, line_no, &context)?,
        value: parse_slot(&fields[4], true, line_no, &context)?,
        format: text(fields, 5),
        lower_is_better: text(fields, 8) == "1",
    };

    Ok(Asset::leaderboard(text(fields, 6), slots)
        .with_id(id)
        .with_description(text(fields, 7)))
}

// ============================================================================
// Record writing
// ============================================================================

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Quote only when the text would otherwise break the record
fn plain(text: &str) -> String {
    if text.contains(':') || text.starts_with('"') {
        quoted(text)
    } else {
        text.to_string()
    }
}

fn write_record(asset: &Asset) -> String {
    match &asset.body {
        AssetBody::Achievement(trigger) => format!(
            "{}:{}:{}:{}::::{}:{}:::::{}",
            asset.id,
            quoted(&serialize_trigger(trigger)),
            quoted(&asset.title),
            quoted(&asset.description),
            plain(&asset.author),
            asset.points,
            plain(&asset.badge_name),
        ),
        AssetBody::Leaderboard(slots) => format!(
            "L{}:{}:{}:{}:{}:{}:{}:{}:{}",
            asset.id,
            quoted(&serialize_trigger(&slots.start)),
            quoted(&serialize_trigger(&slots.cancel)),
            quoted(&serialize_trigger(&slots.submit)),
            quoted(&serialize_value(&slots.value)),
            plain(&slots.format),
            quoted(&asset.title),
            quoted(&asset.description),
            if slots.lower_is_better { 1 } else { 0 },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_trigger;

    const SAMPLE: &str = "1.0\n\
Sample Game\n\
111000001:\"0xH1234=7\":First:Get started::::alice:5:::::00001\n\
111000002:\"R:0xH1=0_0xH2=1\":\"Colon: in title\":\"Say \\\"hi\\\"\"::::bob:10:::::00002\n\
L111000003:\"0xH1=1\":\"0xH1=2\":\"0xH1=3\":\"M:0xH4$M:0xH5\":SCORE:Best Score:Highest wins:0\n";

    #[test]
    fn test_parse_sample() {
        let (file, errors) = LocalAssetFile::parse(1234, SAMPLE);
        assert!(errors.is_empty());
        assert_eq!(file.version, "1.0");
        assert_eq!(file.title(), "Sample Game");
        assert_eq!(file.len(), 3);

        let first = file.get(AssetKind::Achievement, 111_000_001).unwrap();
        assert_eq!(first.title, "First");
        assert_eq!(first.description, "Get started");
        assert_eq!(first.author, "alice");
        assert_eq!(first.points, 5);
        assert_eq!(first.badge_name, "00001");
        assert_eq!(first.category, Category::Local);

        let second = file.get(AssetKind::Achievement, 111_000_002).unwrap();
        assert_eq!(second.title, "Colon: in title");
        assert_eq!(second.description, "Say \"hi\"");

        let board = file.get(AssetKind::Leaderboard, 111_000_003).unwrap();
        let AssetBody::Leaderboard(slots) = &board.body else {
            panic!("expected leaderboard");
        };
        assert_eq!(slots.format, "SCORE");
        assert_eq!(slots.value.alternates.len(), 1);
        assert!(!slots.lower_is_better);
    }

    #[test]
    fn test_untouched_file_round_trips() {
        let (file, _) = LocalAssetFile::parse(1234, SAMPLE);
        assert_eq!(file.to_text(), SAMPLE);

        let crlf = SAMPLE.replace('\n', "\r\n");
        let (file, _) = LocalAssetFile::parse(1234, &crlf);
        assert_eq!(file.to_text(), crlf);
    }

    #[test]
    fn test_mixed_line_endings_are_kept() {
        let text = "1.0\r\nGame\n5:\"0xH1=1\":One:desc\r\n6:\"0xH2=2\":Two:desc";
        let (mut file, errors) = LocalAssetFile::parse(1, text);
        assert!(errors.is_empty());
        assert_eq!(file.to_text(), text);

        let updated = Asset::achievement("Two", parse_trigger("0xH2=3").unwrap()).with_id(6);
        file.upsert(&updated, "me");
        let appended = Asset::achievement("Three", parse_trigger("0xH3=3").unwrap()).with_id(7);
        file.upsert(&appended, "me");

        assert_eq!(
            file.to_text(),
            "1.0\r\nGame\n5:\"0xH1=1\":One:desc\r\n\
6:\"0xH000002=3\":\"Two\":\"\"::::me:0:::::\r\n\
7:\"0xH000003=3\":\"Three\":\"\"::::me:0:::::"
        );
    }

    #[test]
    fn test_upsert_replaces_unreadable_record_with_same_id() {
        let text = "1.0\nGame\n111000001:\"0xQ1=1\":Broken:desc\nL111000001:\"0xQ\"\n";
        let (mut file, errors) = LocalAssetFile::parse(1, text);
        assert_eq!(errors.len(), 2);

        let fixed = Asset::achievement("Fixed", parse_trigger("0xH1=1").unwrap()).with_id(111_000_001);
        file.upsert(&fixed, "me");

        let text = file.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "111000001:\"0xH000001=1\":\"Fixed\":\"\"::::me:0:::::");
        assert_eq!(lines[3], "L111000001:\"0xQ\"");
    }

    #[test]
    fn test_bad_record_is_kept_and_reported() {
        let text = "1.0\nGame\n111000001:\"0xQ1=1\":Broken:desc\n5:\"0xH1=1\":Fine:desc\n";
        let (file, errors) = LocalAssetFile::parse(1, text);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 3);
        assert_eq!(errors[0].message, "Invalid trigger for achievement 111000001");
        assert_eq!(errors[0].root_cause().line, 3);
        assert_eq!(file.len(), 1);
        assert_eq!(file.to_text(), text);
    }

    #[test]
    fn test_parse_strict_fails_on_bad_record() {
        let text = "1.0\nGame\nnot-a-number:\"0xH1=1\":Title\n";
        let err = LocalAssetFile::parse_strict(1, text).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 3, .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        let (_, errors) = LocalAssetFile::parse(1, "1.0\nGame\n1:\"0xH1=1:Title\n");
        assert_eq!(errors[0].message, "Unterminated quoted field");
        assert_eq!(errors[0].column, 3);
    }

    #[test]
    fn test_upsert_replaces_only_target_record() {
        let (mut file, _) = LocalAssetFile::parse(1234, SAMPLE);
        let updated = Asset::achievement("First", parse_trigger("0xH1234=8").unwrap())
            .with_id(111_000_001)
            .with_description("Get started")
            .with_points(5)
            .with_badge("00001");
        file.upsert(&updated, "carol");

        let text = file.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[2],
            "111000001:\"0xH001234=8\":\"First\":\"Get started\"::::carol:5:::::00001"
        );
        assert_eq!(lines[3], SAMPLE.lines().nth(3).unwrap());
        assert_eq!(lines[4], SAMPLE.lines().nth(4).unwrap());
    }

    #[test]
    fn test_upsert_appends_and_reparses() {
        let mut file = LocalAssetFile::new(99);
        file.set_title("New Game");

        let slots = LeaderboardSlots {
            start: parse_trigger("0xH1=1").unwrap(),
            cancel: parse_trigger("0xH1=2").unwrap(),
            submit: parse_trigger("0xH1=3").unwrap(),
            value: crate::codec::parse_value("M:0xH4").unwrap(),
            format: "TIME".to_string(),
            lower_is_better: true,
        };
        let board = Asset::leaderboard("Fastest", slots.clone()).with_id(111_000_000);
        file.upsert(&board, "dave");

        let text = file.to_text();
        assert_eq!(
            text,
            "1.0\nNew Game\nL111000000:\"0xH000001=1\":\"0xH000001=2\":\"0xH000001=3\":\"M:0xH000004\":TIME:\"Fastest\":\"\":1\n"
        );

        let (reparsed, errors) = LocalAssetFile::parse(99, &text);
        assert!(errors.is_empty());
        let AssetBody::Leaderboard(parsed) = &reparsed.get(AssetKind::Leaderboard, 111_000_000).unwrap().body else {
            panic!("expected leaderboard");
        };
        assert_eq!(parsed, &slots);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = LocalAssetFile::path_for(dir.path(), 1234);
        assert!(path.ends_with("1234-User.txt"));

        let (file, _) = LocalAssetFile::parse(1234, SAMPLE);
        file.save(&path).unwrap();

        let (loaded, errors) = LocalAssetFile::load(&path, 1234).unwrap();
        assert!(errors.is_empty());
        assert_eq!(loaded.to_text(), SAMPLE);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalAssetFile::load(dir.path().join("nope.txt"), 1).unwrap_err();
        assert!(err.is_not_found());
    }
}
