//! Command handlers. Each takes the store by reference and writes its report
//! to `out`.

use std::{fs::File, io::Write, path::Path, process::ExitCode};

use anyhow::{Context as _, Result, bail};
use gvi_core::{
  ingest::Normalizer,
  movers::{MoverQuery, find_movers},
  overview::{
    TickerOverview, UploadFilter, UploadStats, closest_start_date, region_overview,
  },
  record::DeleteFilter,
  store::ScoreStore,
  upload::upload,
};
use gvi_sheet::{SheetSource, export};
use serde::Serialize;

use crate::{
  cli::{AnalyzeArgs, Command, ExportKind},
  render,
  settings::Settings,
};

pub fn run<S>(
  store: &S,
  settings: &Settings,
  command: Command,
  out: &mut impl Write,
) -> Result<ExitCode>
where
  S: ScoreStore,
{
  match command {
    Command::Upload { file, date, region, strict } => {
      let region = region.unwrap_or(settings.default_region);
      let source = SheetSource::open(&file, settings.preamble_rows);
      let normalizer = if strict || settings.strict_ingest {
        Normalizer::strict()
      } else {
        Normalizer::default()
      };

      writeln!(out, "Uploading {} for {region} on {date}...", file.display())?;
      let outcome = upload(store, &source, date, region, normalizer)
        .context("failed to record upload")?;
      writeln!(out, "{}", outcome.message())?;

      if !outcome.is_success() {
        return Ok(ExitCode::FAILURE);
      }
    }

    Command::Dates { region, json } => {
      let dates = match region {
        Some(r) => store.list_dates_for_region(r)?,
        None => store.list_dates()?,
      };
      if json {
        write_json(out, &dates)?;
      } else {
        writeln!(out, "Available dates ({} total):", dates.len())?;
        for date in dates {
          writeln!(out, "  {date}")?;
        }
      }
    }

    Command::Regions { json } => {
      let regions = store.list_regions()?;
      if json {
        write_json(out, &regions)?;
      } else {
        for region in regions {
          writeln!(out, "{region}")?;
        }
      }
    }

    Command::Summary { by_region, json } => {
      let summary = store.summary()?;
      match (by_region, json) {
        (true, true) => write_json(out, &region_overview(&summary))?,
        (true, false) => render::region_overview(out, &region_overview(&summary))?,
        (false, true) => write_json(out, &summary)?,
        (false, false) => render::summary(out, &summary)?,
      }
    }

    Command::Analyze(args) => analyze(store, args, out)?,

    Command::Export { output, kind, date, region } => {
      // Nothing is written to disk until the query has succeeded.
      let rows = match kind {
        ExportKind::Summary => {
          let summary = store.summary()?;
          export::write_summary(create(&output)?, &summary)?;
          summary.len()
        }
        ExportKind::Uploads => {
          let uploads = store.upload_history()?;
          export::write_upload_history(create(&output)?, &uploads)?;
          uploads.len()
        }
        ExportKind::Snapshot => {
          let Some(date) = date else { bail!("--date is required for a snapshot export") };
          let records = store.snapshot_at(date, region)?;
          export::write_snapshot(create(&output)?, &records)?;
          records.len()
        }
      };
      writeln!(out, "Exported {rows} rows to {}", output.display())?;
    }

    Command::Ticker { symbol, region, export: csv_path, json } => {
      let symbol = symbol.trim().to_uppercase();
      let history = store.history_for(&symbol, region)?;
      let Some(overview) = TickerOverview::from_history(&history) else {
        writeln!(out, "No data found for {symbol}")?;
        return Ok(ExitCode::FAILURE);
      };

      if let Some(path) = &csv_path {
        export::write_ticker_history(create(path)?, &history)?;
        tracing::info!(path = %path.display(), rows = history.len(), "wrote ticker history");
      }

      if json {
        write_json(out, &serde_json::json!({ "overview": overview, "history": history }))?;
      } else {
        render::ticker(out, &overview, &history)?;
      }
    }

    Command::History { status, region, json } => {
      let uploads = store.upload_history()?;
      let filtered = UploadFilter { status, region }.apply(&uploads);
      if json {
        write_json(out, &filtered)?;
      } else {
        render::upload_stats(out, &UploadStats::from_history(&uploads))?;
        render::uploads(out, &filtered)?;
      }
    }

    Command::Delete { date, region } => {
      let filter = DeleteFilter { date, region };
      let deleted = store
        .delete_data(&filter)
        .with_context(|| format!("failed to delete data for {filter}"))?;
      writeln!(out, "Deleted data for {filter} ({deleted} records)")?;
    }

    Command::Migrate => {
      let report = store.migrate().context("migration failed")?;
      if report.is_noop() {
        writeln!(out, "Database schema is already up to date")?;
      } else {
        render::migration(out, &report)?;
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}

fn analyze<S: ScoreStore>(store: &S, args: AnalyzeArgs, out: &mut impl Write) -> Result<()> {
  let start = match (args.start, args.months) {
    (Some(start), _) => start,
    (None, Some(months)) => {
      let dates = match args.region {
        Some(r) => store.list_dates_for_region(r)?,
        None => store.list_dates()?,
      };
      let Some(start) = closest_start_date(&dates, args.end, months) else {
        bail!("no stored date earlier than {}", args.end);
      };
      tracing::info!(%start, months, "using closest available start date");
      start
    }
    (None, None) => bail!("either --start or --months is required"),
  };

  let query = MoverQuery {
    start,
    end: args.end,
    region: args.region,
    thresholds: args.thresholds(),
  };
  let report = find_movers(store, &query)?;

  if let Some(dir) = &args.export_dir {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating export directory {}", dir.display()))?;
    let stem = format!("{}_to_{}", report.start, report.end);
    export::write_movements(
      create(&dir.join(format!("top_entrants_{stem}.csv")))?,
      &report.top_entrants,
    )?;
    export::write_movements(
      create(&dir.join(format!("bottom_entrants_{stem}.csv")))?,
      &report.bottom_entrants,
    )?;
    export::write_movements(
      create(&dir.join(format!("all_movements_{stem}.csv")))?,
      &report.all_movements,
    )?;
  }

  if args.json {
    write_json(out, &report)
  } else {
    Ok(render::movement_report(out, &report, args.limit)?)
  }
}

fn create(path: &Path) -> Result<File> {
  File::create(path).with_context(|| format!("creating {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
  serde_json::to_writer_pretty(&mut *out, value)?;
  writeln!(out)?;
  Ok(())
}
