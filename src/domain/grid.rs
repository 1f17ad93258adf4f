// Grid canvas settings
use serde::{Deserialize, Serialize};

pub const ALLOWED_CELL_SIZES: [u32; 4] = [20, 40, 80, 160];
pub const DEFAULT_CELL_SIZE: u32 = 40;
pub const DEFAULT_GAP: u32 = 8;

/// Any cell size outside [`ALLOWED_CELL_SIZES`] falls back to the default.
pub fn coerce_cell_size(size: u32) -> u32 {
    if ALLOWED_CELL_SIZES.contains(&size) {
        size
    } else {
        DEFAULT_CELL_SIZE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridSettings {
    pub cell_size: u32,
    pub gap: u32,
    pub cols: u32,
    pub rows: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            gap: DEFAULT_GAP,
            cols: 0,
            rows: 0,
        }
    }
}

impl GridSettings {
    /// Default settings with cols/rows sized to fill a viewport.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let pitch = DEFAULT_CELL_SIZE + DEFAULT_GAP;
        Self {
            cols: width / pitch,
            rows: height / pitch,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, patch: GridPatch) {
        if let Some(cell_size) = patch.cell_size {
            self.cell_size = coerce_cell_size(cell_size);
        }
        if let Some(gap) = patch.gap {
            self.gap = gap;
        }
        if let Some(cols) = patch.cols {
            self.cols = cols;
        }
        if let Some(rows) = patch.rows {
            self.rows = rows;
        }
    }

    pub fn sanitized(self) -> Self {
        Self {
            cell_size: coerce_cell_size(self.cell_size),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridPatch {
    pub cell_size: Option<u32>,
    pub gap: Option<u32>,
    pub cols: Option<u32>,
    pub rows: Option<u32>,
}
