/// Command-line parser for rpgp.

use clap::{App, Arg, SubCommand, AppSettings};

pub fn build() -> App<'static, 'static> {
    App::new("rpgp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("An implementation of OpenPGP.  This is a command-line frontend.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("homedir").value_name("DIRECTORY")
             .long("homedir")
             .help("Sets the home directory to use"))
        .arg(Arg::with_name("force")
             .long("force")
             .short("f")
             .help("Overwrite existing files"))
        .arg(Arg::with_name("verbose")
             .long("verbose")
             .short("v")
             .multiple(true)
             .help("Enables diagnostic logging, repeat for more detail"))
        .subcommand(SubCommand::with_name("generate-key")
                    .display_order(10)
                    .about("Generates a new key from a JSON-described request")
                    .arg(Arg::with_name("request").value_name("FILE")
                         .long("request")
                         .short("r")
                         .takes_value(true)
                         .help("Reads the JSON key-generation request from \
                                this file (default: stdin)"))
                    .arg(Arg::with_name("output").value_name("FILE")
                         .long("output")
                         .short("o")
                         .help("Sets the output file for the generated \
                                certificate (default: stdout)"))
                    .arg(Arg::with_name("binary")
                         .long("binary")
                         .short("B")
                         .help("Don't ASCII-armor encode the OpenPGP data")))
        .subcommand(SubCommand::with_name("sign")
                    .display_order(20)
                    .about("Signs a message")
                    .arg(Arg::with_name("input").value_name("FILE")
                         .help("Sets the input file to use"))
                    .arg(Arg::with_name("output").value_name("FILE")
                         .long("output")
                         .short("o")
                         .help("Sets the output file to use"))
                    .arg(Arg::with_name("binary")
                         .long("binary")
                         .short("B")
                         .help("Don't ASCII-armor encode the OpenPGP data"))
                    .arg(Arg::with_name("detached")
                         .long("detached")
                         .help("Create a detached signature"))
                    .arg(Arg::with_name("secret-key-file")
                         .long("secret-key-file")
                         .required(true)
                         .multiple(true)
                         .takes_value(true)
                         .value_name("TSK-FILE")
                         .number_of_values(1)
                         .help("Secret key to sign with, given as a file \
                                (can be given multiple times)")))
        .subcommand(SubCommand::with_name("verify")
                    .display_order(30)
                    .about("Verifies a message")
                    .arg(Arg::with_name("input").value_name("FILE")
                         .help("Sets the input file to use"))
                    .arg(Arg::with_name("output").value_name("FILE")
                         .long("output")
                         .short("o")
                         .help("Sets the output file to use"))
                    .arg(Arg::with_name("detached")
                         .long("detached")
                         .takes_value(true)
                         .value_name("SIG-FILE")
                         .help("Verifies a detached signature"))
                    .arg(Arg::with_name("sender-cert-file")
                         .long("sender-cert-file")
                         .required(true)
                         .multiple(true)
                         .takes_value(true)
                         .value_name("CERT-FILE")
                         .number_of_values(1)
                         .help("The sender's certificate to verify \
                                signatures with, given as a file \
                                (can be given multiple times)")))
        .subcommand(SubCommand::with_name("encrypt")
                    .display_order(40)
                    .about("Encrypts a message")
                    .arg(Arg::with_name("input").value_name("FILE")
                         .help("Sets the input file to use"))
                    .arg(Arg::with_name("output").value_name("FILE")
                         .long("output")
                         .short("o")
                         .help("Sets the output file to use"))
                    .arg(Arg::with_name("binary")
                         .long("binary")
                         .short("B")
                         .help("Don't ASCII-armor encode the OpenPGP data"))
                    .arg(Arg::with_name("recipients-cert-file")
                         .long("recipients-cert-file")
                         .multiple(true)
                         .takes_value(true)
                         .value_name("CERT-FILE")
                         .number_of_values(1)
                         .help("Recipients to encrypt for, given as a file \
                                (can be given multiple times)"))
                    .arg(Arg::with_name("signer-key-file")
                         .long("signer-key-file")
                         .multiple(true)
                         .takes_value(true)
                         .value_name("TSK-FILE")
                         .number_of_values(1)
                         .help("Secret key to sign with before encrypting \
                                (can be given multiple times)"))
                    .arg(Arg::with_name("symmetric")
                         .long("symmetric")
                         .short("s")
                         .multiple(true)
                         .takes_value(true)
                         .value_name("PASSWORD")
                         .number_of_values(1)
                         .help("Encrypt with a password \
                                (can be given multiple times)"))
                    .arg(Arg::with_name("cipher")
                         .value_name("ALGO")
                         .long("cipher")
                         .possible_values(&["aes128", "aes192", "aes256"])
                         .default_value("aes256")
                         .help("Symmetric cipher used for the message"))
                    .arg(Arg::with_name("compression")
                         .value_name("KIND")
                         .long("compression")
                         .possible_values(&["none", "zip", "zlib", "bzip2"])
                         .default_value("none")
                         .help("Selects compression scheme to use")))
        .subcommand(SubCommand::with_name("decrypt")
                    .display_order(50)
                    .about("Decrypts an OpenPGP message")
                    .arg(Arg::with_name("input").value_name("FILE")
                         .help("Sets the input file to use"))
                    .arg(Arg::with_name("output").value_name("FILE")
                         .long("output")
                         .short("o")
                         .help("Sets the output file to use"))
                    .arg(Arg::with_name("secret-key-file")
                         .long("secret-key-file")
                         .multiple(true)
                         .takes_value(true)
                         .value_name("TSK-FILE")
                         .number_of_values(1)
                         .help("Secret key to decrypt with, given as a file \
                                (can be given multiple times)"))
                    .arg(Arg::with_name("password")
                         .long("password")
                         .takes_value(true)
                         .value_name("PASSWORD")
                         .help("Password to try for symmetrically-encrypted \
                                recipients")))
        .subcommand(SubCommand::with_name("list-keys")
                    .display_order(60)
                    .about("Lists the certificates in one or more files")
                    .arg(Arg::with_name("input").value_name("FILE")
                         .multiple(true)
                         .help("Sets the input files to use")))
}
