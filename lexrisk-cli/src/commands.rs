pub mod expand;
pub mod lexicon;
pub mod score;
