//! Merge rules: date-time phrases and ranges.
//!
//! ```text
//! 3. juunil  kell 14           DATE + TIME             -> phrase (DATE)
//! juunist    augustini         RANGE_FROM + RANGE_TO   -> range, split
//! 3.-        5. juunini        RANGE_DAY_FROM + DATE   -> range across "3.-5.", split
//! esmaspäev  kuni  reede       DATE kuni DATE          -> range, split
//! ```

use crate::pattern::{MergeRule, WordPattern};

fn connector() -> WordPattern {
    lit!["kuni", "-"]
}

pub fn merge_rules() -> Vec<MergeRule> {
    vec![
        MergeRule::phrase("<date> <time>", "DATE", "TIME").marker("DATE"),
        MergeRule::range("<from> <to>", "RANGE_FROM", "RANGE_TO").splitting(),
        MergeRule::range("<from> kuni <to>", "RANGE_FROM", "RANGE_TO").with_connector(connector()).splitting(),
        MergeRule::range("<day>-<date>", "RANGE_DAY_FROM", "DATE").across_range_split().splitting(),
        MergeRule::range("<yyyy>-<yyyy>", "RANGE_YEAR_FROM", "DATE").across_range_split().splitting(),
        MergeRule::range("<date> kuni <date>", "DATE", "DATE").with_connector(connector()).splitting(),
    ]
}
