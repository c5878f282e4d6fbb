mod bit_stream;
mod container;
mod engine;
mod error;
mod huffman;

use clap::{arg, command, Command};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compress")
                .about("Compress a file into a self-contained container")
                .arg(arg!(input: <INPUT> "Input path"))
                .arg(arg!(output: <OUTPUT> "Output path")),
        )
        .subcommand(
            Command::new("decompress")
                .about("Restore the original file from a container")
                .arg(arg!(input: <INPUT> "Container path"))
                .arg(arg!(output: <OUTPUT> "Output path")),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("compress") {
        let input = matches.get_one::<String>("input").unwrap();
        let output = matches.get_one::<String>("output").unwrap();
        let stats = engine::compress(input, output)?;

        println!("Compression completed in {} ms.", stats.elapsed.as_millis());
        println!("Original size: {} bytes", stats.input_size);
        println!("Compressed size: {} bytes", stats.output_size);
        println!("Compression ratio: {:.2}%", stats.ratio());
    } else if let Some(matches) = matches.subcommand_matches("decompress") {
        let input = matches.get_one::<String>("input").unwrap();
        let output = matches.get_one::<String>("output").unwrap();
        let stats = engine::decompress(input, output)?;

        println!(
            "Decompression completed in {} ms.",
            stats.elapsed.as_millis()
        );
    }

    Ok(())
}
