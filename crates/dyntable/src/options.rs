use serde::{Deserialize, Serialize};

/// Storage tuning for a [`Table`](crate::Table).
///
/// Each block size is the number of slots reserved (or released) at once for that kind of
/// storage. Zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub column_block: usize,
    pub row_block: usize,
    pub callback_block: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            column_block: 10,
            row_block: 20,
            callback_block: 10,
        }
    }
}

impl TableOptions {
    pub(crate) fn normalized(self) -> Self {
        Self {
            column_block: self.column_block.max(1),
            row_block: self.row_block.max(1),
            callback_block: self.callback_block.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: TableOptions = serde_json::from_str(r#"{"row_block": 64}"#).unwrap();
        assert_eq!(
            options,
            TableOptions {
                row_block: 64,
                ..TableOptions::default()
            }
        );
    }

    #[test]
    fn zero_blocks_are_normalized() {
        let options = TableOptions {
            column_block: 0,
            row_block: 0,
            callback_block: 3,
        }
        .normalized();
        assert_eq!(options.column_block, 1);
        assert_eq!(options.row_block, 1);
        assert_eq!(options.callback_block, 3);
    }
}
