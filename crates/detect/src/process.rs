/// Whether `process_name` is the configured player executable.
///
/// Comparison ignores case and a trailing `.exe`, so `Spotify.exe`,
/// `spotify` and `SPOTIFY.EXE` all match each other.
pub fn is_player_process(process_name: &str, player_process: &str) -> bool {
    let process = strip_exe(process_name.trim());
    let player = strip_exe(player_process.trim());
    !player.is_empty() && process.eq_ignore_ascii_case(player)
}

fn strip_exe(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".exe")
    {
        &name[..len - 4]
    } else {
        name
    }
}

#[cfg(windows)]
pub(crate) fn process_name(system: &mut sysinfo::System, pid: u32) -> Option<String> {
    let pid = sysinfo::Pid::from_u32(pid);
    system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
    let process = system.process(pid)?;
    Some(process.name().to_string_lossy().into_owned())
}
