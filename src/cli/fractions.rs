use super::ui;
use crate::core::form::{FormValidation, FractionForm, NewFraction};
use crate::core::fraction::FractionRecord;
use crate::core::money::format_fraction;
use crate::providers::ApiClient;
use anyhow::{Result, bail};
use comfy_table::Cell;
use tracing::info;

pub const ITEMS_PER_PAGE: usize = 10;

/// One page of a listing; `page` is 1-based.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

pub fn paginate<T>(items: &[T], page: usize) -> Page<'_, T> {
    let total_pages = items.len().div_ceil(ITEMS_PER_PAGE);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(ITEMS_PER_PAGE).min(items.len());
    let end = (start + ITEMS_PER_PAGE).min(items.len());
    Page {
        items: &items[start..end],
        page,
        total_pages,
    }
}

pub fn render_table(records: &[FractionRecord]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Unit"),
        ui::header_cell("Fraction"),
        ui::header_cell("Type"),
    ]);

    for record in records {
        let id = record
            .id
            .map_or_else(|| ui::na_cell(false), |id| ui::number_cell(&id.to_string()));
        let fraction = record.fraction.map_or_else(
            || ui::na_cell(true),
            |f| ui::number_cell(&format_fraction(f)),
        );
        table.add_row(vec![
            id,
            Cell::new(&record.location),
            fraction,
            Cell::new(record.unit_type.label()),
        ]);
    }

    table.to_string()
}

pub async fn list(client: &ApiClient, page: usize) -> Result<()> {
    let spinner = ui::new_spinner("Fetching fractions...");
    let records = client.list_fractions().await;
    spinner.finish_and_clear();
    let records = records?;

    if records.is_empty() {
        println!("No fractions registered.");
        return Ok(());
    }

    let page = paginate(&records, page);
    if page.items.is_empty() {
        bail!(
            "Page {} does not exist, there are {} page(s)",
            page.page,
            page.total_pages
        );
    }

    println!("{}", ui::style_text("Fractions", ui::StyleType::Title));
    println!("{}", render_table(page.items));
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Page {} of {} ({} records)",
                page.page,
                page.total_pages,
                records.len()
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

pub async fn show(client: &ApiClient, id: u64) -> Result<()> {
    let record = client.get_fraction(id).await?;
    println!("{}", render_table(std::slice::from_ref(&record)));
    Ok(())
}

fn validated(form: &FractionForm) -> Result<NewFraction> {
    match form.validate() {
        FormValidation::Valid(fraction) => Ok(fraction),
        FormValidation::Invalid(errors) => {
            for (field, error) in errors.entries() {
                eprintln!(
                    "{}",
                    ui::style_text(&format!("{field}: {error}"), ui::StyleType::Error)
                );
            }
            bail!("Invalid fraction: {errors}")
        }
    }
}

pub async fn create(client: &ApiClient, form: &FractionForm) -> Result<()> {
    let fraction = validated(form)?;
    client.create_fraction(&fraction).await?;
    info!(location = %fraction.location, "Fraction created");
    println!(
        "Fraction for unit {} ({}) created.",
        fraction.location,
        fraction.unit_type.label()
    );
    Ok(())
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Default, Clone)]
pub struct FractionChanges {
    pub location: Option<String>,
    pub unit_type: Option<String>,
    pub fraction: Option<String>,
}

impl FractionChanges {
    pub fn apply(self, mut form: FractionForm) -> FractionForm {
        if let Some(location) = self.location {
            form.location = location;
        }
        if let Some(unit_type) = self.unit_type {
            form.unit_type = unit_type;
        }
        if let Some(fraction) = self.fraction {
            form.fraction = fraction;
        }
        form
    }
}

pub async fn update(client: &ApiClient, id: u64, changes: FractionChanges) -> Result<()> {
    let current = client.get_fraction(id).await?;
    let form = changes.apply(FractionForm::from_record(&current));
    let fraction = validated(&form)?;
    client.update_fraction(id, &fraction).await?;
    info!(id, "Fraction updated");
    println!("Fraction {id} updated.");
    Ok(())
}

pub async fn delete(client: &ApiClient, id: u64) -> Result<()> {
    client.delete_fraction(id).await?;
    info!(id, "Fraction deleted");
    println!("Fraction {id} deleted.");
    Ok(())
}
