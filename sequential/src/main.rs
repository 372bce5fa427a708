use common::{load_app, App, JobOutput, Pipeline};
use eyre::{Result, WrapErr};
use log::{debug, info};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Opt {
    #[structopt(short, long)]
    app_name: PathBuf,
    #[structopt(short, long, required = true)]
    input_files: Vec<PathBuf>,
    #[structopt(short, long, default_value = "mr-out-0")]
    output: PathBuf,
    /// Worker threads, 0 for one per CPU
    #[structopt(short, long, default_value = "0")]
    threads: usize,
}

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init()
}

/// Every line of every input file, in order. Lines are decoded one by one,
/// invalid UTF-8 is replaced rather than failing the file.
fn read_records(files: &[PathBuf]) -> Result<Vec<String>> {
    let mut records = Vec::new();
    for file in files {
        let reader = File::open(file)
            .map(BufReader::new)
            .wrap_err_with(|| format!("opening {}", file.display()))?;
        for line in reader.split(b'\n') {
            let mut line = line.wrap_err_with(|| format!("reading {}", file.display()))?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            records.push(decode_line(line));
        }
    }
    Ok(records)
}

fn decode_line(line: Vec<u8>) -> String {
    String::from_utf8(line).unwrap_or_else(|e| {
        debug!("invalid utf-8 in record: {}", e);
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })
}

fn write_records(path: &Path, records: &[String]) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    writer.flush()?;
    Ok(())
}

fn run(app: &dyn App, opt: &Opt) -> Result<JobOutput> {
    let records = read_records(&opt.input_files)?;
    info!("{} records from {} files", records.len(), opt.input_files.len());

    let output = Pipeline::new(app).threads(opt.threads).run(records)?;
    write_records(&opt.output, &output.records)?;
    info!("wrote {} records to {}", output.records.len(), opt.output.display());
    Ok(output)
}

fn main() -> Result<()> {
    init_logger();

    let opt = Opt::from_args();
    let app = load_app(&opt.app_name)?;

    let output = run(&**app, &opt)?;
    if !output.counters.is_empty() {
        eprint!("Counters:\n{}", output.counters);
    }
    Ok(())
}
