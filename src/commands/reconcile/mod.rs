mod db;
mod matching;
mod money;
mod ordering;
mod period;
mod pipeline;
mod run;
#[cfg(test)]
mod tests;

pub use run::run;
