use uuid::Uuid;

/// An unordered pair of profiles, stored with the smaller id first.
///
/// Connection and block rows carry these as `user_low`/`user_high`, so
/// "A and B" and "B and A" hit the same unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub low: Uuid,
    pub high: Uuid,
}

impl PairKey {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.low == id || self.high == id
    }

    /// The member that is not `id`, or `None` if `id` is not in the pair.
    pub fn other(&self, id: Uuid) -> Option<Uuid> {
        if self.low == id {
            Some(self.high)
        } else if self.high == id {
            Some(self.low)
        } else {
            None
        }
    }

    /// A pair of a profile with itself.
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}
