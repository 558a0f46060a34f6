use std::ffi::OsString;

fn main() {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    if args.is_empty() {
        args.push(OsString::from("zabbix-drive-report"));
    }
    args.insert(1, OsString::from("drive"));
    if let Err(err) = zabbix_report::cli::run(args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
