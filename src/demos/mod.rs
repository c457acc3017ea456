pub mod streaming_rom;
