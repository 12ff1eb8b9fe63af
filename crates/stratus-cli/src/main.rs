use std::time::Duration;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;

use stratus_app::forecast_model::SELECT_LOCATION_HINT;
use stratus_app::{
    trend, ConnectivityMonitor, ForecastModel, NetworkState, SearchController,
};
use stratus_weather::{ForecastClient, GeocodingClient, ReverseGeocoder, UnsupportedPlatform};

#[tokio::main]
async fn main() -> Result<()> {
    stratus_core::init()?;

    let config = match stratus_core::Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{} ({})", err.user_message(), err);
            stratus_core::Config::default()
        }
    };

    let validation = config.validate();
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        anyhow::bail!("Configuration invalid: {}", validation.error_summary());
    }

    let timeout = Duration::from_secs(u64::from(config.http.timeout_seconds));
    let geocoder = GeocodingClient::new(&config.endpoints.geocoding_base_url, timeout)?;
    let forecast_client = ForecastClient::new(&config.endpoints.forecast_base_url, timeout)?;
    let reverse = ReverseGeocoder::new(
        &config.endpoints.reverse_base_url,
        &config.http.user_agent,
        timeout,
    )?;

    let controller = SearchController::new(geocoder, &config.search);
    let monitor = ConnectivityMonitor::new(NetworkState::ONLINE);
    let _retry = stratus_app::spawn_retry_on_reconnect(controller.clone(), monitor.subscribe());

    let forecast = ForecastModel::new(forecast_client);
    let _views = forecast.spawn(controller.watch_selected());

    let position_provider = UnsupportedPlatform;

    println!("Stratus weather");
    println!("Type to edit the search box; `:help` lists commands.");

    // Same startup behavior as the app: try the device location first.
    controller.locate(&position_provider, &reverse).await;
    print_status(&controller);

    let debounce = Duration::from_millis(config.search.debounce_ms);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        match line.as_str() {
            "" => continue,
            ":quit" | ":q" => break,
            ":help" => print_help(),
            ":locate" => {
                controller.locate(&position_provider, &reverse).await;
                print_status(&controller);
            }
            ":submit" => {
                controller.submit().await;
                print_status(&controller);
            }
            ":offline" => {
                monitor.report(NetworkState::OFFLINE);
                println!("Network marked offline.");
            }
            ":online" => {
                monitor.report(NetworkState::ONLINE);
                println!("Network marked online.");
            }
            ":show" => print_status(&controller),
            ":current" => print_current(&forecast),
            ":today" => print_today(&forecast),
            ":weekly" => print_weekly(&forecast),
            _ if line.starts_with(":pick") => {
                match parse_pick(&line) {
                    Some(index) => pick_suggestion(&controller, index),
                    None => println!("Usage: :pick <number>"),
                }
                print_status(&controller);
            }
            _ if line.starts_with(':') => println!("Unknown command; `:help` lists commands."),
            _ => {
                controller.set_query(&line);
                // Give the debouncer time to settle before printing.
                tokio::time::sleep(debounce + Duration::from_millis(300)).await;
                print_suggestions(&controller);
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  <text>     edit the search box (shows suggestions)");
    println!("  :pick <n>  select the n-th suggestion");
    println!("  :submit    submit the search box (exact match only)");
    println!("  :locate    use the device location");
    println!("  :current   current conditions");
    println!("  :today     today's hourly trend");
    println!("  :weekly    weekly trend");
    println!("  :show      location and status");
    println!("  :offline / :online   simulate connectivity changes");
    println!("  :quit");
}

fn parse_pick(line: &str) -> Option<usize> {
    line.strip_prefix(":pick")?.trim().parse::<usize>().ok()
}

fn pick_suggestion(controller: &SearchController, index: usize) {
    let state = controller.snapshot();
    match index
        .checked_sub(1)
        .and_then(|i| state.suggestions.get(i))
    {
        Some(candidate) => controller.select_candidate(candidate),
        None => println!("No suggestion #{index}."),
    }
}

fn print_status(controller: &SearchController) {
    let state = controller.snapshot();
    match (&state.selected, &state.message) {
        (Some(location), _) => println!("Location: {}", location.display()),
        (None, Some(message)) => println!("{message}"),
        (None, None) => println!("No location selected."),
    }
    if controller.pending_retry().is_some() {
        println!("(submission queued for retry on reconnect)");
    }
}

fn print_suggestions(controller: &SearchController) {
    let state = controller.snapshot();
    if state.suggestions_loading {
        println!("Loading suggestions...");
        return;
    }
    if !state.suggestions_visible || state.suggestions.is_empty() {
        println!("No suggestions.");
        return;
    }
    for (index, candidate) in state.suggestions.iter().enumerate() {
        println!("  {}. {}", index + 1, candidate.label());
    }
}

fn print_current(forecast: &ForecastModel) {
    let state = forecast.snapshot();
    let Some(location) = &state.location else {
        println!("{}", state.message.as_deref().unwrap_or(SELECT_LOCATION_HINT));
        return;
    };
    println!("{}", location.display());
    if state.loading {
        println!("Loading...");
        return;
    }
    if let Some(message) = &state.message {
        println!("{message}");
        return;
    }
    if let Some(current) = &state.current {
        println!("Temperature: {} °C", current.temperature_2m);
        println!("Weather code: {}", current.weather_code);
        println!("Wind: {} km/h", current.wind_speed_10m);
    }
}

fn print_today(forecast: &ForecastModel) {
    let state = forecast.snapshot();
    let Some(location) = &state.location else {
        println!("{}", state.message.as_deref().unwrap_or(SELECT_LOCATION_HINT));
        return;
    };
    println!("{}", location.display());
    if state.loading {
        println!("Loading...");
        return;
    }
    if let Some(message) = &state.message {
        println!("{message}");
        return;
    }

    let temps: Vec<f64> = state.hourly.iter().map(|h| h.temperature_2m).collect();
    if temps.len() >= 2 {
        let lowest = temps.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let segments = trend::tick_segments(lowest, highest, trend::HOURLY_MAX_SEGMENTS);
        println!("Today's temperature ({segments} axis segments)");
    }
    for (index, hour) in state.hourly.iter().enumerate() {
        let label = trend::hourly_label(&hour.time, index);
        if !label.is_empty() {
            println!(
                "  {}h  {:>5.1} °C  wind {:>5.1} km/h  code {}",
                label, hour.temperature_2m, hour.wind_speed_10m, hour.weather_code
            );
        }
    }
}

fn print_weekly(forecast: &ForecastModel) {
    let state = forecast.snapshot();
    let Some(location) = &state.location else {
        println!("{}", state.message.as_deref().unwrap_or(SELECT_LOCATION_HINT));
        return;
    };
    println!("{}", location.display());
    if state.loading {
        println!("Loading...");
        return;
    }
    if let Some(message) = &state.message {
        println!("{message}");
        return;
    }

    if state.daily.len() >= 2 {
        let lowest = state
            .daily
            .iter()
            .map(|d| d.temperature_2m_min)
            .fold(f64::INFINITY, f64::min);
        let highest = state
            .daily
            .iter()
            .map(|d| d.temperature_2m_max)
            .fold(f64::NEG_INFINITY, f64::max);
        let segments = trend::tick_segments(lowest, highest, trend::WEEKLY_MAX_SEGMENTS);
        println!("Weekly temperature ({segments} axis segments)");
    }
    for day in &state.daily {
        println!(
            "  {} {}  min {:>4.0}°  max {:>4.0}°  code {}",
            trend::day_label(&day.date),
            trend::short_date_label(&day.date),
            day.temperature_2m_min,
            day.temperature_2m_max,
            day.weather_code
        );
    }
}
