/*!
 * Glossary of recurring terms and their chosen translations.
 *
 * - `table`: the in-memory table, rebuilt from the document at activation
 * - `manager`: term registration, translation lookup and table rebuild
 */

pub mod manager;
pub mod table;

pub use manager::{GlossaryManager, Registration, TranslationChoice};
pub use table::{GlossaryEntry, GlossaryTable, OrderedSet};
