//! Command-line interface for htmy
//! This binary renders htmy templates against a JSON data scope.
//!
//! Usage:
//!   htmy render `<template>` [--views `<dir>`] [--data `<file>`]                  - Render a template to stdout
//!   htmy serve `<template>` [--views `<dir>`] [--data `<file>`] [--addr `<addr>`] - Serve the rendered template over HTTP

use std::sync::Arc;

use clap::{Arg, ArgMatches, Command};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use htmy::{Error, Renderer, Scope, Value};

fn main() {
    let matches = Command::new("htmy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A template language that renders htmy files to HTML")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("render")
                .about("Render a template to stdout")
                .arg(template_arg())
                .arg(views_arg())
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the rendered template over HTTP")
                .arg(template_arg())
                .arg(views_arg())
                .arg(data_arg())
                .arg(
                    Arg::new("addr")
                        .long("addr")
                        .help("Address to listen on")
                        .default_value("127.0.0.1:8080"),
                ),
        )
        .get_matches();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    });

    match matches.subcommand() {
        Some(("render", matches)) => runtime.block_on(handle_render_command(matches)),
        Some(("serve", matches)) => runtime.block_on(handle_serve_command(matches)),
        _ => unreachable!("subcommand is required"),
    }
}

fn template_arg() -> Arg {
    Arg::new("template")
        .help("Template name, resolved under the views directory")
        .required(true)
        .index(1)
}

fn views_arg() -> Arg {
    Arg::new("views")
        .long("views")
        .help("Views directory holding templates and a components/ subdirectory")
        .default_value("views")
}

fn data_arg() -> Arg {
    Arg::new("data")
        .long("data")
        .help("JSON object file providing the data scope")
}

/// Handle the render command
async fn handle_render_command(matches: &ArgMatches) {
    let (renderer, template, scope) = setup(matches);

    let html = renderer.render(&template, scope).await.unwrap_or_else(|e| {
        eprintln!("Render error: {}", e);
        std::process::exit(1);
    });

    println!("{}", html);
}

/// Handle the serve command
async fn handle_serve_command(matches: &ArgMatches) {
    let (renderer, template, scope) = setup(matches);

    let addr = matches
        .get_one::<String>("addr")
        .expect("addr has a default");

    let listener = TcpListener::bind(addr).await.unwrap_or_else(|e| {
        eprintln!("Bind error on {}: {}", addr, e);
        std::process::exit(1);
    });

    println!("server listening http://{}", addr);

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                eprintln!("Accept error: {}", e);
                continue;
            }
        };

        match renderer.render(&template, Arc::clone(&scope)).await {
            Ok(html) => respond(stream, "200 OK", "text/html", &html).await,
            Err(e) => {
                eprintln!("Render error: {}", e);
                respond(stream, "500 Internal Server Error", "text/plain", &e.to_string()).await;
            }
        }
    }
}

fn setup(matches: &ArgMatches) -> (Renderer, String, Arc<Scope>) {
    let views = matches
        .get_one::<String>("views")
        .expect("views has a default");
    let template = matches
        .get_one::<String>("template")
        .expect("template is required");

    let scope = match matches.get_one::<String>("data") {
        Some(path) => load_scope(path),
        None => Scope::new(),
    };

    (Renderer::new(views), template.clone(), scope)
}

/// Reads the data file and binds its top-level fields as scope variables.
fn load_scope(path: &str) -> Arc<Scope> {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Data error reading {}: {}", path, e);
        std::process::exit(1);
    });

    let json: serde_json::Value = serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Data error parsing {}: {}", path, e);
        std::process::exit(1);
    });

    match Value::from_json(&json) {
        Value::Record(fields) => Scope::with_values(fields),
        _ => {
            let error = Error::UnsupportedData {
                found: json_type(&json),
            };
            eprintln!("Data error in {}: {}", path, error);
            std::process::exit(1);
        }
    }
}

fn json_type(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Minimal one-shot HTTP exchange: drain the request head, write the
/// response, close.
async fn respond(mut stream: tokio::net::TcpStream, status: &str, content_type: &str, body: &str) {
    let mut buffer = [0u8; 4096];
    let _ = stream.read(&mut buffer).await;

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
