fn main() -> std::process::ExitCode {
    snap_help_lib::run()
}
