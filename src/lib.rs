/// Club Leagues — sdílený kód binárek (konfigurace)
pub mod config;
