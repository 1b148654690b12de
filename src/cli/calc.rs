use super::ui;
use crate::core::form::FieldError;
use crate::core::fraction::{FractionProvider, FractionTable, load_table};
use crate::core::money::{format_currency, format_fraction};
use crate::core::rateio::{CalculationInput, Calculator, CalculatorState, InputErrors, calculate};
use crate::core::session::{Session, SessionUser};
use crate::core::unit::UnitType;
use crate::core::Recalculation;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Renders the calculator state the way the terminal shows it.
pub fn render_state(state: &CalculatorState) -> String {
    match state {
        CalculatorState::Resolved(result) => format!(
            "Unit {} ({}), fraction {}\n{} {}",
            result.location,
            result.unit_type.label(),
            format_fraction(result.fraction),
            ui::style_text("Amount due:", ui::StyleType::TotalLabel),
            ui::style_text(&format_currency(result.amount_due), ui::StyleType::TotalValue),
        ),
        CalculatorState::Unresolved {
            unit_type,
            location,
            reason,
        } => ui::style_text(
            &format!("Unit {location} ({}): {reason}", unit_type.label()),
            ui::StyleType::Warning,
        ),
        CalculatorState::Idle(errors) => render_errors(errors),
    }
}

fn render_errors(errors: &InputErrors) -> String {
    let mut lines = Vec::new();
    for (field, error) in [
        ("unit", errors.location.as_ref()),
        ("total", errors.total_amount.as_ref()),
    ] {
        match error {
            Some(FieldError::Invalid(msg)) => {
                lines.push(ui::style_text(&format!("{field}: {msg}"), ui::StyleType::Error))
            }
            Some(FieldError::Missing) => lines.push(ui::style_text(
                &format!("{field}: waiting for input"),
                ui::StyleType::Subtle,
            )),
            None => {}
        }
    }
    lines.join("\n")
}

async fn fetch_table(provider: &(dyn FractionProvider + Send + Sync)) -> FractionTable {
    let spinner = ui::new_spinner("Loading fractions...");
    let table = load_table(provider).await;
    spinner.finish_and_clear();
    table
}

/// One-shot calculation. Prints the outcome and hands it back to the caller.
pub async fn run(
    provider: &(dyn FractionProvider + Send + Sync),
    input: &CalculationInput,
) -> Result<CalculatorState> {
    let table = fetch_table(provider).await;
    let state = calculate(&table, input);
    debug!(?state, "Calculated rateio");
    println!("{}", render_state(&state));
    Ok(state)
}

/// What a line typed in interactive mode asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    Continue(Option<String>),
    Quit,
}

const HELP: &str = "Commands:
  type <APTO|LOJA|BOX>   set the unit type
  unit <number>          set the unit number
  total <amount>         set the total expense (e.g. 12.500,00)
  submit                 calculate now
  show                   show the current input and result
  quit                   leave";

/// Applies one interactive command to the calculator.
pub fn apply_line(calculator: &mut Calculator<'_>, line: &str) -> LineOutcome {
    let line = line.trim();
    let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
    let argument = argument.trim();
    let command = command.to_lowercase();
    let policy = calculator.policy();

    let state = match command.as_str() {
        "" => return LineOutcome::Continue(None),
        "quit" | "exit" | "q" => return LineOutcome::Quit,
        "help" | "?" => return LineOutcome::Continue(Some(HELP.to_string())),
        "type" | "tipo" => match argument.parse::<UnitType>() {
            Ok(unit_type) => calculator.set_unit_type(unit_type),
            Err(e) => {
                return LineOutcome::Continue(Some(ui::style_text(
                    &format!("type: {e}"),
                    ui::StyleType::Error,
                )));
            }
        },
        "unit" | "location" | "unidade" => calculator.set_location(argument),
        "total" | "valor" => calculator.set_total_amount(argument),
        "submit" | "calc" => calculator.submit(),
        "show" => {
            let input = calculator.input();
            let summary = format!(
                "type={} unit='{}' total='{}'\n{}",
                input.unit_type,
                input.location,
                input.total_amount,
                render_state(calculator.state())
            );
            return LineOutcome::Continue(Some(summary));
        }
        other => {
            return LineOutcome::Continue(Some(format!(
                "Unknown command '{other}'. Type 'help' for the list of commands."
            )));
        }
    };

    if policy == Recalculation::OnSubmit && !matches!(command.as_str(), "submit" | "calc") {
        return LineOutcome::Continue(None);
    }
    LineOutcome::Continue(Some(render_state(state)))
}

/// Line-oriented calculator over stdin.
pub async fn interactive(
    provider: &(dyn FractionProvider + Send + Sync),
    session: &Session,
    policy: Recalculation,
    default_type: UnitType,
) -> Result<()> {
    let spinner = ui::new_spinner("Loading fractions...");
    let (table, user): (FractionTable, Option<SessionUser>) =
        futures::join!(load_table(provider), session.current_user());
    spinner.finish_and_clear();

    println!("{}", ui::style_text("Rateio calculator", ui::StyleType::Title));
    if let Some(current) = user {
        println!(
            "{}",
            ui::style_text(
                &format!("Logged in as {}", current.user.name),
                ui::StyleType::Subtle
            )
        );
    }
    if table.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No fractions available, no unit will match.",
                ui::StyleType::Warning
            )
        );
    }
    let mode = match policy {
        Recalculation::Reactive => "results update as you type",
        Recalculation::OnSubmit => "type 'submit' to calculate",
    };
    println!("{} units loaded, {mode}. Type 'help' for commands.", table.len());

    let mut calculator = Calculator::new(&table, policy, default_type);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
    {
        match apply_line(&mut calculator, &line) {
            LineOutcome::Continue(Some(output)) => println!("{output}"),
            LineOutcome::Continue(None) => {}
            LineOutcome::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fraction::FractionRecord;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn table() -> FractionTable {
        FractionTable::new(vec![FractionRecord::new(
            "08",
            UnitType::Apartment,
            Decimal::from_str("0.015").unwrap(),
        )])
    }

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).to_string()
    }

    #[test]
    fn test_render_resolved_state() {
        let table = table();
        let state = calculate(
            &table,
            &CalculationInput::new(UnitType::Apartment, "8", "1.000,00"),
        );
        let text = plain(&render_state(&state));
        assert!(text.contains("Unit 08 (Apartamento)"));
        assert!(text.contains("R$ 15,00"));
    }

    #[test]
    fn test_render_unresolved_and_idle_states() {
        let table = table();
        let state = calculate(
            &table,
            &CalculationInput::new(UnitType::Apartment, "09", "1.000,00"),
        );
        assert!(plain(&render_state(&state)).contains("no fraction registered"));

        let state = calculate(
            &table,
            &CalculationInput::new(UnitType::Apartment, "8", "12,,50"),
        );
        assert!(plain(&render_state(&state)).starts_with("total:"));
    }

    #[test]
    fn test_interactive_reactive_session() {
        let table = table();
        let mut calc = Calculator::new(&table, Recalculation::Reactive, UnitType::Apartment);

        assert!(matches!(apply_line(&mut calc, "unit 8"), LineOutcome::Continue(Some(_))));
        let LineOutcome::Continue(Some(output)) = apply_line(&mut calc, "total 1.000,00") else {
            panic!("Expected output");
        };
        assert!(plain(&output).contains("R$ 15,00"));
        assert_eq!(apply_line(&mut calc, "quit"), LineOutcome::Quit);
    }

    #[test]
    fn test_interactive_on_submit_session() {
        let table = table();
        let mut calc = Calculator::new(&table, Recalculation::OnSubmit, UnitType::Apartment);

        assert_eq!(apply_line(&mut calc, "unit 8"), LineOutcome::Continue(None));
        assert_eq!(
            apply_line(&mut calc, "total 1.000,00"),
            LineOutcome::Continue(None)
        );
        let LineOutcome::Continue(Some(output)) = apply_line(&mut calc, "submit") else {
            panic!("Expected output");
        };
        assert!(plain(&output).contains("R$ 15,00"));
    }

    #[test]
    fn test_interactive_rejects_unknown_input() {
        let table = table();
        let mut calc = Calculator::new(&table, Recalculation::Reactive, UnitType::Apartment);

        let LineOutcome::Continue(Some(output)) = apply_line(&mut calc, "type casa") else {
            panic!("Expected output");
        };
        assert!(plain(&output).contains("Invalid unit type"));
        assert_eq!(calc.input().unit_type, UnitType::Apartment);

        let LineOutcome::Continue(Some(output)) = apply_line(&mut calc, "dance") else {
            panic!("Expected output");
        };
        assert!(output.contains("Unknown command"));
    }
}
