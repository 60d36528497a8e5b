use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;

use crate::{
    dataset::Dataset,
    errors::DashboardError,
    models::reports::AggregateRow,
    report::{AnalysisMode, LabelBy, Report},
    Overview,
};

use super::{
    components::{DashboardTab, FocusedWidget, StatusMessage},
    DashboardUI,
};

const SIDEBAR_WIDTH: u16 = 38;
const PREVIEW_HEIGHT: u16 = 9;

pub fn draw(f: &mut Frame, ui: &DashboardUI) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)].as_ref())
        .split(size);

    draw_sidebar(f, ui, chunks[0]);
    draw_main(f, ui, chunks[1]);
}

fn draw_sidebar(f: &mut Frame, ui: &DashboardUI, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(6),
                Constraint::Length(4),
                Constraint::Min(4),
                Constraint::Length(10),
            ]
            .as_ref(),
        )
        .split(area);

    let input_focused = ui.current_focus == FocusedWidget::PathInput;
    let mut import_lines = vec![Line::from(format!(
        "Fichier CSV: {}{}",
        ui.path_input,
        if input_focused { "_" } else { "" }
    ))];
    if let Some(dataset) = &ui.dataset {
        import_lines.push(Line::from(format!("{} lignes", dataset.len())));
        import_lines.push(Line::from(format!(
            "Table détectée: {}",
            dataset
                .classify()
                .map(|table| table.to_string())
                .unwrap_or_else(|| "aucune".to_string())
        )));
    }

    let import_block = Block::default()
        .title("Import des données")
        .borders(Borders::ALL)
        .border_style(focus_style(input_focused));
    let import_widget = Paragraph::new(import_lines)
        .block(import_block)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });
    f.render_widget(import_widget, chunks[0]);

    let modes: Vec<ListItem> = AnalysisMode::ALL
        .iter()
        .map(|mode| {
            let text = format!("Analyse en {}", mode.label().to_lowercase());
            if *mode == ui.mode {
                ListItem::new(format!("(•) {}", text)).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(format!("( ) {}", text)).style(Style::default().fg(Color::White))
            }
        })
        .collect();
    let modes_widget =
        List::new(modes).block(Block::default().title("Type d'analyse").borders(Borders::ALL));
    f.render_widget(modes_widget, chunks[1]);

    let (status_text, status_color) = match &ui.status {
        Some(StatusMessage::Info(msg)) => (msg.as_str(), Color::Cyan),
        Some(StatusMessage::Success(msg)) => (msg.as_str(), Color::Green),
        Some(StatusMessage::Error(msg)) => (msg.as_str(), Color::Red),
        None => ("", Color::White),
    };
    let status_widget = Paragraph::new(status_text)
        .block(Block::default().title("Statut").borders(Borders::ALL))
        .style(Style::default().fg(status_color))
        .wrap(Wrap { trim: true });
    f.render_widget(status_widget, chunks[2]);

    let help_message = vec![
        help_line("Enter", Color::Green, "charger le fichier"),
        help_line("Tab", Color::Yellow, "saisie / tableau de bord"),
        help_line("u", Color::Green, "importer dans la base"),
        help_line("m", Color::Yellow, "volume / valeur"),
        help_line("Left/Right", Color::Yellow, "onglets"),
        help_line("Up/Down", Color::Yellow, "villes"),
        help_line("r", Color::Yellow, "actualiser"),
        help_line("q", Color::Red, "quitter"),
    ];
    let help_paragraph = Paragraph::new(help_message)
        .block(Block::default().title("Aide").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    f.render_widget(help_paragraph, chunks[3]);
}

fn draw_main(f: &mut Frame, ui: &DashboardUI, area: Rect) {
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(8),
    ];
    if ui.dataset.is_some() {
        constraints.push(Constraint::Length(PREVIEW_HEIGHT));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let title = Paragraph::new(Span::styled(
        "Dashboard des Ventes",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    draw_headline(f, ui, chunks[1]);

    let tabs = Tabs::new(DashboardTab::ALL.iter().map(|tab| tab.title()))
        .select(ui.current_tab.index())
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[2]);

    match &ui.overview {
        None => {
            let loading = Paragraph::new("Chargement...")
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, chunks[3]);
        }
        Some(overview) => match ui.current_tab {
            DashboardTab::Products => draw_products(f, overview, chunks[3]),
            DashboardTab::Shops => draw_shops(f, overview, ui.selected_town, chunks[3]),
            DashboardTab::Distribution => draw_distribution(f, overview, chunks[3]),
        },
    }

    if let Some(dataset) = &ui.dataset {
        draw_preview(f, dataset, chunks[4]);
    }
}

fn draw_headline(f: &mut Frame, ui: &DashboardUI, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let line = match ui.overview.as_ref().map(|overview| &overview.by_shop) {
        None => Line::from(ui.mode.headline_title()),
        Some(Ok(report)) => Line::from(vec![
            Span::raw(format!("{}: ", ui.mode.headline_title())),
            Span::styled(
                ui.mode.format_total(report.total()),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Some(Err(err)) => Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )),
    };
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_products(f: &mut Frame, overview: &Overview, area: Rect) {
    let title = format!("Ventes par produit ({})", overview.mode.label());
    let report = match &overview.by_product {
        Ok(report) => report,
        Err(err) => return draw_error(f, &title, err, area),
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(area);

    let mode = report.mode;
    draw_bar_chart(
        f,
        &title,
        &report.series(LabelBy::Product),
        chart_scale(mode),
        |v| mode.format_cell(Some(v)),
        chunks[0],
    );
    draw_report_table(f, "Détail", report, chunks[1]);
}

fn draw_shops(f: &mut Frame, overview: &Overview, selected_town: usize, area: Rect) {
    let title = format!("Détails par magasin ({})", overview.mode.label());
    let report = match &overview.by_shop_by_product {
        Ok(report) => report,
        Err(err) => return draw_error(f, &title, err, area),
    };

    let towns = report.towns();
    if towns.is_empty() {
        return draw_empty(f, &title, area);
    }
    let selected = selected_town.min(towns.len() - 1);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)].as_ref())
        .split(area);

    let town_items: Vec<ListItem> = towns
        .iter()
        .enumerate()
        .map(|(i, town)| {
            if i == selected {
                ListItem::new(town.to_string()).style(
                    Style::default()
                        .bg(Color::Yellow)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(town.to_string()).style(Style::default().fg(Color::White))
            }
        })
        .collect();
    let towns_widget = List::new(town_items).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(towns_widget, chunks[0]);

    let town = towns[selected];
    let town_report = report.for_town(town);
    let mode = town_report.mode;

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Percentage(50),
                Constraint::Min(4),
            ]
            .as_ref(),
        )
        .split(chunks[1]);

    let metric = Paragraph::new(Line::from(vec![
        Span::raw(format!("{}: ", mode.town_title())),
        Span::styled(
            mode.format_total(town_report.total()),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().title(town.to_string()).borders(Borders::ALL));
    f.render_widget(metric, right_chunks[0]);

    draw_bar_chart(
        f,
        "Produits",
        &town_report.series(LabelBy::Product),
        chart_scale(mode),
        |v| mode.format_cell(Some(v)),
        right_chunks[1],
    );
    draw_report_table(f, "Détail", &town_report, right_chunks[2]);
}

fn draw_distribution(f: &mut Frame, overview: &Overview, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let sections = [
        (&overview.by_product, LabelBy::Product, "par Produit"),
        (&overview.by_shop, LabelBy::Town, "par Magasin"),
    ];
    for ((section, label_by, suffix), chunk) in sections.into_iter().zip(chunks.iter()) {
        let title = format!("{} {}", overview.mode.label(), suffix);
        match section {
            Ok(report) => draw_bar_chart(
                f,
                &title,
                &report.shares(label_by),
                10.0,
                |share| format!("{:.1}%", share),
                *chunk,
            ),
            Err(err) => draw_error(f, &title, err, *chunk),
        }
    }
}

fn draw_preview(f: &mut Frame, dataset: &Dataset, area: Rect) {
    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = dataset
        .rows()
        .iter()
        .take(visible)
        .map(|row| Row::new(row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()))
        .collect();

    let column_count = dataset.columns().len().max(1) as u32;
    let widths = vec![Constraint::Ratio(1, column_count); column_count as usize];

    let table = Table::new(rows, widths)
        .header(
            Row::new(dataset.columns().to_vec())
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title(format!(
                    "Aperçu des données importées ({} lignes)",
                    dataset.len()
                ))
                .borders(Borders::ALL),
        );
    f.render_widget(table, area);
}

fn draw_report_table(f: &mut Frame, title: &str, report: &Report, area: Rect) {
    let columns = report.columns();
    let highlighted = report.max_index();

    let rows: Vec<Row> = report
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row_cells(row, columns, report.mode);
            if Some(i) == highlighted {
                Row::new(cells).style(Style::default().bg(Color::Yellow).fg(Color::Black))
            } else {
                Row::new(cells)
            }
        })
        .collect();

    let widths = vec![Constraint::Ratio(1, columns.len() as u32); columns.len()];
    let table = Table::new(rows, widths)
        .header(
            Row::new(columns.to_vec()).style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    f.render_widget(table, area);
}

fn row_cells(row: &AggregateRow, columns: &[&str], mode: AnalysisMode) -> Vec<String> {
    columns
        .iter()
        .map(|column| match *column {
            "town" => row.town.clone().unwrap_or_default(),
            "shop_id" => row.shop_id.clone().unwrap_or_default(),
            "product_reference" => row.product_reference.clone().unwrap_or_default(),
            _ => mode.format_cell(row.total),
        })
        .collect()
}

/// Horizontal bars; `scale` turns values into the integer bar lengths.
fn draw_bar_chart<F>(
    f: &mut Frame,
    title: &str,
    series: &[(String, f64)],
    scale: f64,
    format_value: F,
    area: Rect,
) where
    F: Fn(f64) -> String,
{
    if series.is_empty() {
        return draw_empty(f, title, area);
    }

    let bars: Vec<Bar> = series
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value((value.max(0.0) * scale).round() as u64)
                .label(Line::from(label.clone()))
                .text_value(format_value(*value))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn draw_error(f: &mut Frame, title: &str, err: &DashboardError, area: Rect) {
    let widget = Paragraph::new(err.to_string())
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
    f.render_widget(widget, area);
}

fn draw_empty(f: &mut Frame, title: &str, area: Rect) {
    let widget = Paragraph::new("Aucune donnée")
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, area);
}

fn chart_scale(mode: AnalysisMode) -> f64 {
    match mode {
        AnalysisMode::Volume => 1.0,
        AnalysisMode::Value => 100.0,
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

fn help_line<'a>(key: &'a str, color: Color, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            key,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}", action)),
    ])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    use super::*;
    use crate::{api::MockBackend, report::Breakdown, Dashboard};

    fn ui() -> DashboardUI {
        DashboardUI::new(Dashboard::new(Arc::new(MockBackend::new())))
    }

    fn overview(mode: AnalysisMode) -> Overview {
        Overview {
            mode,
            by_shop: Report::decode(
                mode,
                Breakdown::ByShop,
                vec![json!(["Paris", 1, 1200]), json!(["Lyon", 2, 300])],
            ),
            by_product: Report::decode(
                mode,
                Breakdown::ByProduct,
                vec![json!(["REF001", 1000]), json!(["REF002", 500])],
            ),
            by_shop_by_product: Report::decode(
                mode,
                Breakdown::ByShopByProduct,
                vec![
                    json!(["Paris", 1, "REF001", 900]),
                    json!(["Paris", 1, "REF002", 300]),
                    json!(["Lyon", 2, "REF001", 100]),
                    json!(["Lyon", 2, "REF002", "abc"]),
                ],
            ),
        }
    }

    fn render(ui: &DashboardUI) -> String {
        let backend = TestBackend::new(170, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, ui)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_without_data() {
        let screen = render(&ui());
        assert!(screen.contains("Dashboard des Ventes"));
        assert!(screen.contains("(•) Analyse en volume"));
        assert!(screen.contains("Chargement..."));
    }

    #[test]
    fn test_renders_headline_and_products() {
        let mut ui = ui();
        ui.overview = Some(overview(AnalysisMode::Volume));

        let screen = render(&ui);
        assert!(screen.contains("Volume Total: 1,500 unités"), "{}", screen);
        assert!(screen.contains("Ventes par produit (Volume)"));
        assert!(screen.contains("REF002"));
    }

    #[test]
    fn test_renders_value_mode_town_details() {
        let mut ui = ui();
        ui.mode = AnalysisMode::Value;
        ui.overview = Some(overview(AnalysisMode::Value));
        ui.current_tab = DashboardTab::Shops;
        ui.selected_town = 1;

        let screen = render(&ui);
        assert!(screen.contains("Chiffre d'Affaires Total: 1,500.00 €"), "{}", screen);
        assert!(screen.contains("Chiffre d'Affaires: 100.00 €"), "{}", screen);
        assert!(screen.contains("(•) Analyse en valeur"));
    }

    #[test]
    fn test_section_error_is_scoped() {
        let mut ui = ui();
        let mut data = overview(AnalysisMode::Volume);
        data.by_product = Err(DashboardError::Backend {
            status: 500,
            message: "db down".to_string(),
        });
        ui.overview = Some(data);
        ui.current_tab = DashboardTab::Distribution;

        let screen = render(&ui);
        assert!(screen.contains("Erreur: db down"));
        assert!(screen.contains("Volume par Magasin"));
        assert!(screen.contains("80.0%"), "{}", screen);
    }

    #[test]
    fn test_renders_preview_and_status() {
        let mut ui = ui();
        ui.dataset = Some(
            Dataset::from_reader("ID Magasin,Ville\n1,Paris\n2,Lyon\n".as_bytes()).unwrap(),
        );
        ui.status = Some(StatusMessage::Success(
            "Données importées avec succès!".to_string(),
        ));

        let screen = render(&ui);
        assert!(screen.contains("Aperçu des données importées (2 lignes)"));
        assert!(screen.contains("Table détectée: shops"));
        assert!(screen.contains("Données importées avec succès!"));
    }
}
