pub mod midi_file;
