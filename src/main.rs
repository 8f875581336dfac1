use clap::*;
use clap_num::maybe_hex;
use log::{debug, error, info, LevelFilter};
use rwstream::{error::Error, file_exists, StreamHandle, Whence};
use serde::Serialize;

/// Summary printed by `--info`.
#[derive(Serialize)]
struct StreamInfo<'a> {
    path: &'a str,
    mode: &'a str,
    size: i64,
    position: i64,
}

/// Offsets accept a leading `-` in front of a decimal or `0x` hex magnitude.
fn parse_offset(s: &str) -> Result<i64, String> {
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = i128::from(maybe_hex::<u64>(magnitude)?);
    let offset = if negative { -magnitude } else { magnitude };
    i64::try_from(offset).map_err(|_| format!("offset {} is out of range", s))
}

fn render_info(info: &StreamInfo) -> Result<String, Error> {
    serde_json::to_string_pretty(info).map_err(|err| Error::Io {
        context: "cannot serialize stream info".into(),
        source: err.into(),
    })
}

enum Action<'a> {
    Read(u64),
    Write(&'a str),
    Info,
}

fn process_stream(
    file_path: &str,
    mode: &str,
    offset: i64,
    whence: Whence,
    action: Action,
) -> Result<(), Error> {
    info!("Opening '{}' with mode '{}'...", file_path, mode);
    let mut stream = StreamHandle::open(file_path, mode)?;

    let position = stream.seek(offset, whence)?;
    debug!("Cursor at {}", position);

    match action {
        Action::Read(size) => {
            let size = usize::try_from(size)
                .map_err(|_| Error::InvalidArgument(format!("size {} is too large", size)))?;
            let bytes = stream.read(size)?;
            if bytes.len() < size {
                info!("Short read: {} of {} bytes", bytes.len(), size);
            }
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Action::Write(text) => {
            stream.write(text.as_bytes())?;
            info!("Wrote {} bytes at offset {}", text.len(), position);
        }
        Action::Info => {
            let info = StreamInfo {
                path: file_path,
                mode,
                size: stream.size()?,
                position: stream.tell()?,
            };
            println!("{}", render_info(&info)?);
        }
    }

    stream.close()
}

fn main() {
    let matches = Command::new("rwstream")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Read, write and probe byte streams.")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_parser(value_parser!(String))
                .required(true)
                .help("The path of the stream to open."),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_parser(value_parser!(String))
                .default_value("rb")
                .help("fopen-style open mode: 'r', 'w', 'a', optionally with '+' and 'b'/'t'."),
        )
        .arg(
            Arg::new("offset")
                .short('o')
                .long("offset")
                .value_parser(parse_offset)
                .allow_negative_numbers(true)
                .required(false)
                .help("Seek to this offset before reading or writing."),
        )
        .arg(
            Arg::new("whence")
                .short('w')
                .long("whence")
                .value_parser(["set", "cur", "end"])
                .default_value("set")
                .help("Origin of the offset."),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .value_parser(maybe_hex::<u64>)
                .required_unless_present_any(["write", "exists", "info"])
                .help("The size (in bytes) to read."),
        )
        .arg(
            Arg::new("write")
                .long("write")
                .value_parser(value_parser!(String))
                .conflicts_with_all(["size", "info"])
                .help("Write this text at the offset instead of reading."),
        )
        .arg(
            Arg::new("exists")
                .long("exists")
                .action(ArgAction::SetTrue)
                .help("Only check whether the file can be opened for reading."),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .action(ArgAction::SetTrue)
                .conflicts_with("size")
                .help("Print the stream size and cursor position as JSON."),
        )
        .arg(
            Arg::new("log_level")
                .short('l')
                .long("log-level")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .default_value("info")
                .help("Set the log verbosity level"),
        )
        .get_matches();

    let log_level_str = matches.get_one::<String>("log_level").unwrap();
    let level_filter = match log_level_str.as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level_filter).init();

    let file_path = matches.get_one::<String>("file").unwrap();

    if matches.get_flag("exists") {
        println!("{}", file_exists(file_path));
        return;
    }

    let mode = matches.get_one::<String>("mode").unwrap();
    let offset = *matches.get_one::<i64>("offset").unwrap_or(&0);
    let whence = match matches.get_one::<String>("whence").unwrap().as_str() {
        "cur" => Whence::Cur,
        "end" => Whence::End,
        _ => Whence::Set,
    };

    let action = if let Some(text) = matches.get_one::<String>("write") {
        Action::Write(text)
    } else if matches.get_flag("info") {
        Action::Info
    } else {
        Action::Read(*matches.get_one::<u64>("size").unwrap())
    };

    if let Err(err) = process_stream(file_path, mode, offset, whence, action) {
        error!("{}", err);
        std::process::exit(1);
    }
}
