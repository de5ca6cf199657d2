/// A declaration the analysis pass wants rewritten
///
/// `start` is the offset of the declared type (where `= ` goes) and `end`
/// the offset just past the declaration (where the initializer body goes).
/// Keys are used in the order given; they are not checked for emptiness
/// or duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTarget {
    /// Path of the file the declaration lives in
    pub file: String,
    pub start: usize,
    pub end: usize,
    pub keys: Vec<String>,
}

impl RewriteTarget {
    pub fn new<K, S>(file: impl Into<String>, start: usize, end: usize, keys: K) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file: file.into(),
            start,
            end,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}
