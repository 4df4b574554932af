/// Cell types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.
///
/// Search passability and arrival safety are separate questions:
/// a River or Enemy cell can be routed through, but stepping onto it ends the run.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CellType {
    Invalid,   // out of bounds or unrecognized code
    Character, // the walker's current cell
    Goal,
    Open,
    Wall,
    River,     // drowns the walker unless bridged
    Enemy,     // catches the walker on arrival
    Bridge,    // placed on River
    Crate,     // placed on Open
}

impl CellType {
    /// Map a level-file code onto the closed tag set.
    /// Anything unrecognized becomes `Invalid`.
    pub fn from_code(code: i32) -> Self {
        match code {
            -9 => CellType::Character,
            -10 => CellType::Goal,
            0 => CellType::Open,
            1 => CellType::Wall,
            2 => CellType::River,
            3 => CellType::Enemy,
            4 => CellType::Bridge,
            5 => CellType::Crate,
            _ => CellType::Invalid,
        }
    }

    /// Map an ASCII level glyph onto the closed tag set.
    ///   '@' Character  'G' Goal  '.'/' ' Open  '#' Wall
    ///   '~' River  'E' Enemy  '=' Bridge  'C' Crate
    pub fn from_glyph(ch: char) -> Self {
        match ch {
            '@' => CellType::Character,
            'G' => CellType::Goal,
            '.' | ' ' => CellType::Open,
            '#' => CellType::Wall,
            '~' => CellType::River,
            'E' => CellType::Enemy,
            '=' => CellType::Bridge,
            'C' => CellType::Crate,
            _ => CellType::Invalid,
        }
    }

    /// May the search expand through this cell?
    pub fn is_search_passable(self) -> bool {
        !matches!(self, CellType::Invalid | CellType::Wall | CellType::Crate)
    }

    /// Does arriving on this cell end the run?
    pub fn is_hazard(self) -> bool {
        matches!(self, CellType::River | CellType::Enemy)
    }
}

/// Blocks the player can place.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlaceKind {
    Bridge,
    Crate,
}

impl PlaceKind {
    /// The cell type the target must currently hold.
    pub fn prerequisite(self) -> CellType {
        match self {
            PlaceKind::Bridge => CellType::River,
            PlaceKind::Crate => CellType::Open,
        }
    }

    /// The cell type the target becomes.
    pub fn result(self) -> CellType {
        match self {
            PlaceKind::Bridge => CellType::Bridge,
            PlaceKind::Crate => CellType::Crate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaceKind::Bridge => "Bridge",
            PlaceKind::Crate => "Crate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_variants() {
        assert_eq!(CellType::from_code(-9), CellType::Character);
        assert_eq!(CellType::from_code(-10), CellType::Goal);
        assert_eq!(CellType::from_code(0), CellType::Open);
        assert_eq!(CellType::from_code(1), CellType::Wall);
        assert_eq!(CellType::from_code(2), CellType::River);
        assert_eq!(CellType::from_code(3), CellType::Enemy);
        assert_eq!(CellType::from_code(4), CellType::Bridge);
        assert_eq!(CellType::from_code(5), CellType::Crate);
    }

    #[test]
    fn unknown_codes_are_invalid() {
        assert_eq!(CellType::from_code(-99), CellType::Invalid);
        assert_eq!(CellType::from_code(6), CellType::Invalid);
        assert_eq!(CellType::from_code(-1), CellType::Invalid);
        assert_eq!(CellType::from_code(i32::MAX), CellType::Invalid);
    }

    #[test]
    fn glyphs_map_to_variants() {
        assert_eq!(CellType::from_glyph('@'), CellType::Character);
        assert_eq!(CellType::from_glyph('G'), CellType::Goal);
        assert_eq!(CellType::from_glyph(' '), CellType::Open);
        assert_eq!(CellType::from_glyph('.'), CellType::Open);
        assert_eq!(CellType::from_glyph('~'), CellType::River);
        assert_eq!(CellType::from_glyph('C'), CellType::Crate);
        assert_eq!(CellType::from_glyph('x'), CellType::Invalid);
    }

    #[test]
    fn only_wall_crate_invalid_block_search() {
        assert!(!CellType::Invalid.is_search_passable());
        assert!(!CellType::Wall.is_search_passable());
        assert!(!CellType::Crate.is_search_passable());

        assert!(CellType::River.is_search_passable());
        assert!(CellType::Enemy.is_search_passable());
        assert!(CellType::Bridge.is_search_passable());
        assert!(CellType::Goal.is_search_passable());
        assert!(CellType::Open.is_search_passable());
        assert!(CellType::Character.is_search_passable());
    }

    #[test]
    fn hazards_are_river_and_enemy() {
        assert!(CellType::River.is_hazard());
        assert!(CellType::Enemy.is_hazard());
        assert!(!CellType::Bridge.is_hazard());
        assert!(!CellType::Goal.is_hazard());
    }

    #[test]
    fn placement_rules() {
        assert_eq!(PlaceKind::Bridge.prerequisite(), CellType::River);
        assert_eq!(PlaceKind::Bridge.result(), CellType::Bridge);
        assert_eq!(PlaceKind::Crate.prerequisite(), CellType::Open);
        assert_eq!(PlaceKind::Crate.result(), CellType::Crate);
    }
}
