/// Borrow the field of `T` that a submitted value is written into.
pub type FieldSetter<T> = fn(&mut T) -> &mut String;

/// Explicit mapping from submitted field names to struct fields.
///
/// ```
/// use snippetbox::{FieldTable, FormShape};
///
/// #[derive(Default)]
/// struct SnippetForm {
///     title: String,
///     content: String,
/// }
///
/// impl FormShape for SnippetForm {
///     fn field_table() -> FieldTable<Self> {
///         FieldTable::<Self>::new()
///             .field("title", |f| &mut f.title)
///             .field("content", |f| &mut f.content)
///     }
/// }
/// ```
pub struct FieldTable<T> {
    pub(crate) fields: Vec<(&'static str, FieldSetter<T>)>,
}

impl<T> FieldTable<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, name: &'static str, setter: FieldSetter<T>) -> Self {
        self.fields.push((name, setter));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A struct that submitted forms can be decoded into.
pub trait FormShape: Default + Sized {
    fn field_table() -> FieldTable<Self>;
}
