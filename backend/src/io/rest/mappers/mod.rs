pub mod journal_mapper;
pub mod observation_mapper;
