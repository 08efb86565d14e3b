//! Field accessors used to locate relation state on an owning type.

/// A pair of plain function pointers reaching field `T` inside `O`.
pub struct FieldLens<O, T> {
    get: fn(&O) -> &T,
    get_mut: fn(&mut O) -> &mut T,
}

impl<O, T> FieldLens<O, T> {
    pub const fn new(get: fn(&O) -> &T, get_mut: fn(&mut O) -> &mut T) -> Self {
        Self { get, get_mut }
    }

    pub fn get<'a>(&self, owner: &'a O) -> &'a T {
        (self.get)(owner)
    }

    pub fn get_mut<'a>(&self, owner: &'a mut O) -> &'a mut T {
        (self.get_mut)(owner)
    }
}

impl<O, T> Clone for FieldLens<O, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, T> Copy for FieldLens<O, T> {}

/// Build a [`FieldLens`] for `owner.field`.
///
/// ```ignore
/// let author_id = field_lens!(Post, author_id);
/// ```
#[macro_export]
macro_rules! field_lens {
    ($owner:ty, $field:ident) => {
        $crate::FieldLens::<$owner, _>::new(|owner| &owner.$field, |owner| &mut owner.$field)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: u32,
        right: String,
    }

    #[test]
    fn test_lens_reads_and_writes() {
        let left = crate::field_lens!(Pair, left);
        let right = crate::field_lens!(Pair, right);
        let mut pair = Pair {
            left: 1,
            right: "a".to_string(),
        };

        *left.get_mut(&mut pair) += 1;
        right.get_mut(&mut pair).push('b');

        assert_eq!(*left.get(&pair), 2);
        assert_eq!(right.get(&pair), "ab");
    }

    #[test]
    fn test_lens_is_copy() {
        let left = FieldLens::<Pair, u32>::new(|p| &p.left, |p| &mut p.left);
        let copy = left;
        let pair = Pair {
            left: 9,
            right: String::new(),
        };
        assert_eq!(*left.get(&pair), *copy.get(&pair));
    }
}
