/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (`.csv` and `.txt` files, sorted by file name)
///   2. Built-in embedded levels
///
/// ## CSV format (`.csv`):
///   Optional first line: `# Level Name`
///   Lines: comma-separated integer cell codes
///     -9 = Character   -10 = Goal   0 = Open   1 = Wall
///      2 = River        3 = Enemy   4 = Bridge 5 = Crate
///   Unknown or unparsable codes load as Invalid.
///
/// ## ASCII format (`.txt`):
///   Optional first line: `# Level Name`
///   Lines: map rows (short rows are padded with Open)
///     '@' = Character   'G' = Goal     '.' or ' ' = Open   '#' = Wall
///     '~' = River       'E' = Enemy    '=' = Bridge        'C' = Crate
///
/// Every level is validated into a `Grid` at load time. A malformed level
/// (ragged CSV rows, missing or duplicate goal/character) is logged and skipped.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::grid::Grid;
use crate::domain::tile::CellType;
use crate::error::{LevelError, LevelResult};

/// A validated level. `grid` is the pristine layout; play happens on a copy.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub grid: Grid,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelFormat {
    Csv,
    Ascii,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// All playable levels: the levels directory if it holds any valid
/// level, otherwise the built-in set.
pub fn load_levels(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let levels = load_from_directory(dir);
        if !levels.is_empty() {
            log::info!("loaded {} levels from {}", levels.len(), dir.display());
            return levels;
        }
        log::warn!("no valid levels in {}, using built-in levels", dir.display());
    }
    embedded_levels()
}

/// Parse level text into a validated level.
pub fn parse_level(content: &str, format: LevelFormat, fallback_name: &str) -> LevelResult<LevelDef> {
    let mut name = String::new();
    let mut rows = vec![];

    for (i, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if i == 0 && is_name_line(line) {
            name = line[1..].trim().to_string();
            continue;
        }
        match format {
            LevelFormat::Csv => {
                if line.trim().is_empty() { continue; }
                rows.push(parse_csv_row(line));
            }
            LevelFormat::Ascii => rows.push(line.chars().map(CellType::from_glyph).collect()),
        }
    }

    // Trailing blank lines are not part of an ASCII map.
    while rows.last().map_or(false, |r: &Vec<CellType>| r.is_empty()) {
        rows.pop();
    }

    // Editors strip trailing spaces; short ASCII rows are padded with open ground.
    if format == LevelFormat::Ascii {
        let max_width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(max_width, CellType::Open);
        }
    }

    if name.is_empty() {
        name = fallback_name.to_string();
    }

    let grid = Grid::from_rows(rows)?;
    Ok(LevelDef { name, grid })
}

fn parse_csv_row(line: &str) -> Vec<CellType> {
    line.trim()
        .split(',')
        .map(|cell| cell.trim().parse::<i32>().map_or(CellType::Invalid, CellType::from_code))
        .collect()
}

/// Distinguish `# Level Name` from an ASCII row of walls.
/// A name line starts with `#` and contains at least one letter.
fn is_name_line(line: &str) -> bool {
    line.starts_with('#') && line[1..].chars().any(|c| c.is_alphabetic())
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("could not list {}: {e}", dir.display());
            return vec![];
        }
    };

    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => LevelFormat::Csv,
            Some("txt") => LevelFormat::Ascii,
            _ => continue,
        };
        match load_file(&path, format) {
            Ok(def) => levels.push(def),
            Err(e) => log::warn!("skipping level {}: {e}", path.display()),
        }
    }
    levels
}

fn load_file(path: &Path, format: LevelFormat) -> LevelResult<LevelDef> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
    let stem = path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    parse_level(&content, format, &stem)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    [
        ("1 - First Crossing", &[
            "##########",
            "#@..~....#",
            "#...~....#",
            "#...~...G#",
            "##########",
        ][..]),
        ("2 - Watchful Eyes", &[
            "############",
            "#@...E.....#",
            "#.##...###.#",
            "#....#...E.#",
            "###.####.#.#",
            "#........#G#",
            "############",
        ][..]),
        ("3 - Delta", &[
            "##############",
            "#@....~......#",
            "#.###.~.##E#.#",
            "#...#.~~~..#.#",
            "###.#...~.##.#",
            "#.E...#.~...G#",
            "##############",
        ][..]),
        ("4 - Long Way Round", &[
            "################",
            "#@.....E.......#",
            "#.####.#.#####.#",
            "#.#....#.....#.#",
            "#.#.##~~~~##.#.#",
            "#...#..E...#...#",
            "###.#.####.#.###",
            "#.....#G.......#",
            "################",
        ][..]),
    ]
    .iter()
    .filter_map(|&(name, map)| match make_embedded(name, map) {
        Ok(def) => Some(def),
        Err(e) => {
            log::error!("built-in level {name} is malformed: {e}");
            None
        }
    })
    .collect()
}

fn make_embedded(name: &str, map: &[&str]) -> LevelResult<LevelDef> {
    let rows = map.iter()
        .map(|row| row.chars().map(CellType::from_glyph).collect())
        .collect();
    Ok(LevelDef { name: name.to_string(), grid: Grid::from_rows(rows)? })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Coord;
    use crate::domain::path;

    #[test]
    fn csv_level_with_name() {
        let text = "# River Bend\n-9,0,2\n1,0,-10\n";
        let def = parse_level(text, LevelFormat::Csv, "fallback").unwrap();
        assert_eq!(def.name, "River Bend");
        assert_eq!(def.grid.width(), 3);
        assert_eq!(def.grid.height(), 2);
        assert_eq!(def.grid.cell_type(2, 0), CellType::River);
        assert_eq!(def.grid.goal(), Some(Coord::new(2, 1)));
        assert_eq!(def.grid.character(), Some(Coord::new(0, 0)));
    }

    #[test]
    fn csv_unknown_codes_become_invalid() {
        let text = "-9, 7,abc\r\n-99,, -10\r\n";
        let def = parse_level(text, LevelFormat::Csv, "stage").unwrap();
        assert_eq!(def.name, "stage");
        assert_eq!(def.grid.cell_type(1, 0), CellType::Invalid);
        assert_eq!(def.grid.cell_type(2, 0), CellType::Invalid);
        assert_eq!(def.grid.cell_type(0, 1), CellType::Invalid);
        assert_eq!(def.grid.cell_type(1, 1), CellType::Invalid);
        assert_eq!(def.grid.cell_type(2, 1), CellType::Goal);
    }

    #[test]
    fn csv_skips_blank_lines() {
        let text = "\n-9,0\n\n0,-10\n\n";
        let def = parse_level(text, LevelFormat::Csv, "x").unwrap();
        assert_eq!(def.grid.height(), 2);
    }

    #[test]
    fn csv_ragged_rows_rejected() {
        let text = "-9,0,0\n0,-10\n";
        assert!(matches!(
            parse_level(text, LevelFormat::Csv, "x"),
            Err(LevelError::Ragged { row: 1, expected: 3, found: 2 })
        ));
    }

    #[test]
    fn ascii_short_rows_padded_with_open() {
        let text = "# Stripped\n@..~\n.\n..G\n";
        let def = parse_level(text, LevelFormat::Ascii, "x").unwrap();
        assert_eq!(def.grid.width(), 4);
        assert_eq!(def.grid.height(), 3);
        assert_eq!(def.grid.cell_type(3, 0), CellType::River);
        assert_eq!(def.grid.cell_type(1, 1), CellType::Open);
        assert_eq!(def.grid.cell_type(3, 1), CellType::Open);
        assert_eq!(def.grid.cell_type(3, 2), CellType::Open);
        assert_eq!(def.grid.goal(), Some(Coord::new(2, 2)));
    }

    #[test]
    fn missing_goal_rejected() {
        assert!(matches!(
            parse_level("-9,0,0\n", LevelFormat::Csv, "x"),
            Err(LevelError::MissingGoal)
        ));
    }

    #[test]
    fn ascii_level_wall_row_is_not_a_name() {
        let text = "####\n#@G#\n####\n";
        let def = parse_level(text, LevelFormat::Ascii, "walls").unwrap();
        assert_eq!(def.name, "walls");
        assert_eq!(def.grid.height(), 3);
        assert_eq!(def.grid.cell_type(0, 0), CellType::Wall);
    }

    #[test]
    fn ascii_level_with_name_and_trailing_blank() {
        let text = "# Tiny\n@.~\n..G\n\n";
        let def = parse_level(text, LevelFormat::Ascii, "x").unwrap();
        assert_eq!(def.name, "Tiny");
        assert_eq!(def.grid.height(), 2);
        assert_eq!(def.grid.cell_type(2, 0), CellType::River);
    }

    #[test]
    fn empty_content_rejected() {
        assert!(matches!(parse_level("", LevelFormat::Ascii, "x"), Err(LevelError::Empty)));
        assert!(matches!(parse_level("# Only A Name\n", LevelFormat::Csv, "x"), Err(LevelError::Empty)));
    }

    #[test]
    fn embedded_levels_are_valid_and_reachable() {
        let levels = embedded_levels();
        assert_eq!(levels.len(), 4);
        for def in &levels {
            let start = def.grid.character().unwrap();
            let goal = def.grid.goal().unwrap();
            let route = path::search(&def.grid, start, goal);
            assert!(!route.is_empty(), "{} has no initial route", def.name);
        }
    }

    #[test]
    fn directory_levels_sorted_and_bad_files_skipped() {
        let dir = std::env::temp_dir().join(format!("riverwalk-levels-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.csv"), "-9,0,-10\n").unwrap();
        std::fs::write(dir.join("a.txt"), "# Alpha\n@.G\n").unwrap();
        std::fs::write(dir.join("c.csv"), "0,0,0\n").unwrap();
        std::fs::write(dir.join("notes.md"), "ignored").unwrap();

        let levels = load_from_directory(&dir);
        let names: Vec<&str> = levels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "b"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_falls_back_to_embedded() {
        let mut config = GameConfig::default();
        config.levels_dir = std::env::temp_dir().join("riverwalk-definitely-missing-dir");
        let levels = load_levels(&config);
        assert_eq!(levels.len(), embedded_levels().len());
    }
}
