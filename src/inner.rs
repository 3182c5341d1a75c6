use std::{
    fmt::Display,
    io::{stdout, BufWriter, Write},
    path::Path,
};

use clap::{CommandFactory, Subcommand};
use clap_complete::{
    generate,
    shells::{Bash, Elvish, Fish, Zsh},
};
use dialoguer::Confirm;
use log::info;
use miette::{bail, miette, IntoDiagnostic, Result};

use crate::options::Options;

#[derive(Debug, Subcommand)]
pub enum Inner {
    /// Generate the autocomplete file for your shell.
    AutoComplete { shell: Option<String> },
    /// Return the current version of meilisearch-cli.
    Version,
}

impl Inner {
    pub fn execute(self) -> Result<()> {
        match self {
            Inner::AutoComplete { shell } => auto_complete(shell),
            Inner::Version => version(),
        }
    }
}

pub fn version() -> Result<()> {
    println!(
        "{} - version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Elvish,
}

impl Shell {
    /// Recognise a shell by its name or by the path of its executable.
    pub fn from_name(shell: &str) -> Result<Self> {
        Ok(match shell.rsplit('/').next() {
            Some("bash") => Shell::Bash,
            Some("zsh") => Shell::Zsh,
            Some("fish") => Shell::Fish,
            Some("elvish") => Shell::Elvish,
            _ => bail!("Unsupported shell `{}`.", shell),
        })
    }

    pub fn generator(&self, writer: impl Write) {
        let mut writer = BufWriter::new(writer);
        let mut opt = Options::command();
        let name = env!("CARGO_BIN_NAME");

        match self {
            Self::Bash => generate(Bash, &mut opt, name, &mut writer),
            Self::Zsh => generate(Zsh, &mut opt, name, &mut writer),
            Self::Fish => generate(Fish, &mut opt, name, &mut writer),
            Self::Elvish => generate(Elvish, &mut opt, name, &mut writer),
        }
    }

    pub fn completion_path(&self, home: &str) -> Result<String> {
        let name = env!("CARGO_BIN_NAME");
        Ok(match self {
            Shell::Bash => format!("{home}/.bash_completion.d/{name}-completion.bash"),
            Shell::Zsh => format!("{home}/.zfunc/_{name}"),
            Shell::Fish => format!("{home}/.config/fish/completions/{name}.fish"),
            Shell::Elvish => bail!("I don't know where the elvish completion files are supposed to be. Redirect the output of `{name} self auto-complete elvish` where you need it."),
        })
    }

    pub fn install_completion(&self) -> Result<()> {
        let home = std::env::var("HOME").into_diagnostic()?;
        let path = self.completion_path(&home)?;
        let file_path = Path::new(&path);
        let dir_path = file_path
            .parent()
            .ok_or_else(|| miette!("Can't access the directory of `{path}`"))?;

        if !dir_path.exists() {
            std::fs::create_dir_all(dir_path).into_diagnostic()?;
        }

        let writer = std::fs::File::create(file_path).into_diagnostic()?;
        self.generator(writer);
        info!("completion written to {path}");

        println!("Done!");
        Ok(())
    }
}

impl Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shell::Bash => write!(f, "bash"),
            Shell::Zsh => write!(f, "zsh"),
            Shell::Fish => write!(f, "fish"),
            Shell::Elvish => write!(f, "elvish"),
        }
    }
}

pub fn auto_complete(shell: Option<String>) -> Result<()> {
    let shell = match shell.or_else(|| std::env::var("SHELL").ok()) {
        Some(shell) => Shell::from_name(&shell)?,
        None => bail!("Can't detect your shell. Env variable $SHELL is not set."),
    };

    if atty::is(atty::Stream::Stdout) {
        let home = std::env::var("HOME").into_diagnostic()?;
        let path = shell.completion_path(&home)?;
        println!(
            "Infered the shell `{shell}`. If this is wrong you can give your shell as argument."
        );
        println!("For {shell} the completion must be installed in `{path}`.");
        println!(
            "The following command must be executed to enable the autocompletion of commands;"
        );
        println!(
            "{} self auto-complete {shell} > {path}",
            env!("CARGO_BIN_NAME"),
        );
        if Confirm::new()
            .with_prompt("Do you want me to install it for you?")
            .interact()
            .into_diagnostic()?
        {
            shell.install_completion()?;
        }
    } else {
        shell.generator(stdout());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_from_name_or_path() {
        assert_eq!(Shell::from_name("zsh").unwrap(), Shell::Zsh);
        assert_eq!(Shell::from_name("/usr/bin/fish").unwrap(), Shell::Fish);
        assert_eq!(Shell::from_name("/bin/bash").unwrap(), Shell::Bash);
        assert!(Shell::from_name("powershell").is_err());
    }

    #[test]
    fn completion_paths() {
        assert_eq!(
            Shell::Zsh.completion_path("/home/meili").unwrap(),
            "/home/meili/.zfunc/_meilisearch-cli"
        );
        assert_eq!(
            Shell::Fish.completion_path("/home/meili").unwrap(),
            "/home/meili/.config/fish/completions/meilisearch-cli.fish"
        );
        assert!(Shell::Elvish.completion_path("/home/meili").is_err());
    }

    #[test]
    fn bash_completion_mentions_the_commands() {
        let mut output = Vec::new();
        Shell::Bash.generator(&mut output);
        let script = String::from_utf8(output).unwrap();
        assert!(script.contains("meilisearch-cli"));
        assert!(script.contains("documents"));
    }
}
