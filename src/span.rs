use std::ops::Range;

/// A byte range in a configuration source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Placeholder for diagnostics with no source location.
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start as u32, r.end as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let s = Span::new(4, 9).merge(Span::new(12, 20));
        assert_eq!(s, Span::new(4, 20));
        assert_eq!(s.range(), 4..20);
    }

    #[test]
    fn from_range() {
        assert_eq!(Span::from(3..7), Span::new(3, 7));
        assert!(Span::dummy().is_dummy());
        assert!(!Span::new(0, 1).is_dummy());
    }
}
