pub mod chunk_aggregator;
