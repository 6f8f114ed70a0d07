// UI layer: interactive menu built on `dialoguer`. Every action maps to one
// client call; results are printed and, for uploads, remembered in the
// history file.

use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{CallContext, Client};
use crate::history::{History, UploadRecord};
use crate::request::Image;
use crate::response::UploadResult;
use crate::transport::Transport;

/// Main interactive menu. Loops until the user picks "Exit".
pub fn main_menu<T: Transport>(api: &Client<T>, cx: CallContext, history: &mut History) -> Result<()> {
    loop {
        let items = vec![
            "Upload file",
            "Get hashsum",
            "Delete upload",
            "Tor endpoint",
            "Recent uploads",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_upload(api, &cx, history)?,
            1 => handle_hashsum(api, &cx, history)?,
            2 => handle_delete(api, &cx, history)?,
            3 => handle_tor_endpoint(api, &cx)?,
            4 => show_history(history),
            5 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Ask for a file and its directives, upload it and record the result.
fn handle_upload<T: Transport>(api: &Client<T>, cx: &CallContext, history: &mut History) -> Result<()> {
    let path: String = Input::new().with_prompt("File path").interact_text()?;
    let image = match Image::from_file(path.trim()) {
        Ok(image) => image,
        Err(e) => {
            println!("{} {}", "Cannot open file:".red(), e);
            return Ok(());
        }
    };

    // 0 lets the server pick its default retention
    let expire: u64 = Input::new()
        .with_prompt("Expire after (days, 0 = default)")
        .default(0)
        .interact_text()?;
    let autodestroy = Confirm::new()
        .with_prompt("Destroy after first download?")
        .default(false)
        .interact()?;
    let randomize = Confirm::new()
        .with_prompt("Randomize file name?")
        .default(false)
        .interact()?;
    let short = Confirm::new()
        .with_prompt("Short URL?")
        .default(false)
        .interact()?;

    let filename = image.filename().to_string();
    let image = image
        .expire(expire)
        .autodestroy(autodestroy)
        .randomize_filename(randomize)
        .short_url(short);

    let pb = spinner("Uploading...")?;
    let res = api.upload(cx, image);
    pb.finish_and_clear();

    match res {
        Ok(urls) => {
            print_upload(&urls);
            if urls.admin.is_some() {
                history.push(UploadRecord::now(filename, urls));
                history.save().context("Saving upload history")?;
            }
        }
        Err(e) => println!("{} {}", "Upload failed:".red(), e),
    }
    Ok(())
}

fn handle_hashsum<T: Transport>(api: &Client<T>, cx: &CallContext, history: &History) -> Result<()> {
    let picked = pick_record(history, "Which upload?", |r| r.urls.file_id().is_some())?;
    let file_id = match picked.as_ref().and_then(|r| r.urls.file_id()) {
        Some(id) => id.to_string(),
        None => Input::new().with_prompt("File id").interact_text()?,
    };

    let pb = spinner("Fetching hashsum...")?;
    let res = api.hashsum(cx, file_id.trim());
    pb.finish_and_clear();

    match res {
        Ok(h) => println!("{} {}", h.algorithm.bold(), h.hashsum),
        Err(e) => println!("{} {}", "Hashsum failed:".red(), e),
    }
    Ok(())
}

fn handle_delete<T: Transport>(api: &Client<T>, cx: &CallContext, history: &mut History) -> Result<()> {
    let picked = pick_record(history, "Which upload?", |r| r.urls.admin.is_some())?;
    let admin_url = match picked.and_then(|r| r.urls.admin) {
        Some(url) => url,
        None => Input::new().with_prompt("Admin URL").interact_text()?,
    };
    let admin_url = admin_url.trim().to_string();

    if !Confirm::new()
        .with_prompt(format!("Delete {}?", admin_url))
        .default(false)
        .interact()?
    {
        return Ok(());
    }

    let pb = spinner("Deleting...")?;
    let res = api.delete(cx, &admin_url);
    pb.finish_and_clear();

    match res {
        Ok(()) => {
            println!("{}", "Deleted".green());
            if history.remove_by_admin(&admin_url).is_some() {
                history.save().context("Saving upload history")?;
            }
        }
        Err(e) => println!("{} {}", "Delete failed:".red(), e),
    }
    Ok(())
}

fn handle_tor_endpoint<T: Transport>(api: &Client<T>, cx: &CallContext) -> Result<()> {
    let pb = spinner("Looking up onion endpoint...")?;
    let res = api.tor_endpoint(cx);
    pb.finish_and_clear();

    match res {
        Ok(host) => println!("{}", host.trim().cyan()),
        Err(e) => println!("{} {}", "Lookup failed:".red(), e),
    }
    Ok(())
}

fn show_history(history: &History) {
    if history.records().is_empty() {
        println!("No uploads yet.");
        return;
    }
    for r in history.records() {
        println!("{}", r.filename.as_str().bold());
        print_upload(&r.urls);
    }
}

fn print_upload(urls: &UploadResult) {
    let lines = [
        ("Admin", &urls.admin),
        ("Download", &urls.download),
        ("Tor download", &urls.tor_download),
    ];
    for (label, url) in lines {
        if let Some(url) = url {
            println!("  {:<13} {}", format!("{}:", label), url);
        }
    }
    if urls.is_empty() {
        println!("{}", "Server accepted the upload but returned no URLs.".yellow());
    }
}

/// Let the user choose a remembered upload. `None` means "type it in".
fn pick_record(
    history: &History,
    prompt: &str,
    usable: impl Fn(&UploadRecord) -> bool,
) -> Result<Option<UploadRecord>> {
    let candidates: Vec<&UploadRecord> = history.records().iter().filter(|r| usable(r)).collect();
    if candidates.is_empty() {
        return Ok(None);
    }

    let mut items: Vec<String> = candidates
        .iter()
        .map(|r| match &r.urls.download {
            Some(d) => format!("{} ({})", r.filename, d),
            None => r.filename.clone(),
        })
        .collect();
    items.push("Enter manually".into());

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(candidates.get(idx).map(|r| (*r).clone()))
}

fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
