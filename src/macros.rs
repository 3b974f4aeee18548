//! Accessor generation macros
//!
//! These macros eliminate repetitive accessor code on the conversion logger.
//! They use `paste` internally for identifier concatenation.

// =============================================================================
// Log category accessor generation
// =============================================================================

/// Generate `xxx()` and `xxx_count()` for each append-only log category
///
/// # Generated methods per category:
/// - `xxx(&self) -> &[Entry]` - entries in recording order
/// - `xxx_count(&self) -> usize` - number of entries
///
/// # Example
/// ```ignore
/// impl ConversionLogger {
///     impl_log_categories!(successes: SuccessEntry, errors: ErrorEntry);
/// }
/// ```
macro_rules! impl_log_categories {
    ($($field:ident: $entry:ty),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Recorded " $field ", oldest first"]
                pub fn $field(&self) -> &[$entry] {
                    &self.$field
                }

                #[doc = "Number of recorded " $field]
                pub fn [<$field _count>](&self) -> usize {
                    self.$field.len()
                }
            )*
        }
    };
}
