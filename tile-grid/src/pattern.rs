//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile file name patterns

/// File name template with the placeholders `Z`, `X` and `Y`
#[derive(PartialEq, Clone, Debug)]
pub struct TilePattern {
    pattern: String,
}

const TOKENS: [char; 3] = ['Z', 'X', 'Y'];

impl TilePattern {
    pub const DEFAULT: &'static str = "Z_X_Y.jpg";

    /// Surrounding whitespace and double quotes are removed.
    pub fn new(pattern: &str) -> TilePattern {
        TilePattern {
            pattern: pattern.replace('"', "").trim().to_string(),
        }
    }
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
    /// File name of tile `(x, y)` at zoom level `z`.
    ///
    /// The first occurrence of each token is replaced, in the order `Z`, `X`, `Y`.
    pub fn filename(&self, z: u8, x: u32, y: u32) -> String {
        self.pattern
            .replacen('Z', &z.to_string(), 1)
            .replacen('X', &x.to_string(), 1)
            .replacen('Y', &y.to_string(), 1)
    }
    /// Placeholders not contained in the pattern
    pub fn missing_tokens(&self) -> Vec<char> {
        TOKENS
            .iter()
            .filter(|token| !self.pattern.contains(**token))
            .cloned()
            .collect()
    }
}

impl Default for TilePattern {
    fn default() -> Self {
        TilePattern::new(TilePattern::DEFAULT)
    }
}

#[test]
fn test_filename() {
    let pattern = TilePattern::new("Z_X_Y.jpg");
    assert_eq!(pattern.filename(5, 3, 7), "5_3_7.jpg");
    assert_eq!(pattern.filename(0, 0, 0), "0_0_0.jpg");
    assert_eq!(pattern.filename(18, 131072, 99999), "18_131072_99999.jpg");

    let pattern = TilePattern::new("tile-X-Y@Z.png");
    assert_eq!(pattern.filename(2, 10, 11), "tile-10-11@2.png");

    // Only the first occurrence is substituted
    let pattern = TilePattern::new("Z_X_Y_X.jpg");
    assert_eq!(pattern.filename(1, 2, 3), "1_2_3_X.jpg");
}

#[test]
fn test_cleanup() {
    let pattern = TilePattern::new("  \"Z_X_Y.png\" ");
    assert_eq!(pattern.as_str(), "Z_X_Y.png");
    assert_eq!(TilePattern::default().as_str(), "Z_X_Y.jpg");
}

#[test]
fn test_missing_tokens() {
    assert!(TilePattern::new("Z_X_Y.jpg").missing_tokens().is_empty());
    assert_eq!(TilePattern::new("X_Y.jpg").missing_tokens(), vec!['Z']);
    assert_eq!(TilePattern::new("tile.jpg").missing_tokens(), vec!['Z', 'X', 'Y']);
}
