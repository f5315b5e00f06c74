use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::BIN_NAME;

#[derive(Args, Debug)]
pub struct ManArgs {
    /// Output directory, relative to the workspace root
    #[arg(long = "out-dir", default_value = "dist/share/man/man1")]
    pub out_dir: PathBuf,
}

pub fn cmd_man(args: ManArgs) -> Result<(), String> {
    let out_dir = crate::workspace_root().join(args.out_dir);
    fs::create_dir_all(&out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    let cmd = nextver::command();
    write_page(&out_dir, BIN_NAME, clap_mangen::Man::new(cmd.clone()))?;

    // One page per subcommand, named the way `man nextver-next` expects.
    for subcommand in cmd.get_subcommands() {
        let page = format!("{BIN_NAME}-{}", subcommand.get_name());
        let man = clap_mangen::Man::new(subcommand.clone()).title(page.to_uppercase());
        write_page(&out_dir, &page, man)?;
    }

    Ok(())
}

fn write_page(out_dir: &Path, page: &str, man: clap_mangen::Man) -> Result<(), String> {
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)
        .map_err(|e| format!("render manpage for {page}: {e}"))?;

    let path = out_dir.join(format!("{page}.1"));
    fs::write(&path, buffer).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
