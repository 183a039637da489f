// Data model: the unit of work flowing through the pipeline.

pub mod event;
