//! Chart Renderer
//! Renders aggregation outputs to PNG artifacts with plotters.
//!
//! Cartesian charts go through `ChartBuilder`; pie and sunburst sectors are
//! computed and drawn by hand as polygons, since plotters has no radial
//! chart type.

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::f64::consts::{PI, TAU};
use std::path::Path;

use crate::stats::{CountRow, MonthSlot, OrgSeries, SunburstRow};

/// Color palette for categorical series.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(233, 30, 99),  // Pink
    RGBColor(0, 188, 212),  // Cyan
    RGBColor(255, 87, 34),  // Deep Orange
    RGBColor(121, 85, 72),  // Brown
    RGBColor(96, 125, 139), // Blue Grey
];

pub const ACCENT: RGBColor = RGBColor(52, 152, 219); // Blue

const SUCCESS_GREEN: RGBColor = RGBColor(46, 204, 113);
const PARTIAL_ORANGE: RGBColor = RGBColor(243, 156, 18);
const FAILURE_RED: RGBColor = RGBColor(231, 76, 60);

/// Creates the static mission charts.
pub struct ChartRenderer;

impl ChartRenderer {
    /// Vertical bar chart with a sequential color ramp over the bar heights.
    pub fn bar_chart(path: &Path, title: &str, y_desc: &str, rows: &[CountRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let root = BitMapBackend::new(path, (1280, 720)).into_drawing_area();
        root.fill(&WHITE)?;

        let peak = rows.iter().map(|r| r.count).max().unwrap_or(1).max(1);
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 32))
            .margin(15)
            .x_label_area_size(150)
            .y_label_area_size(70)
            .build_cartesian_2d((0..rows.len()).into_segmented(), 0u32..peak + peak / 10 + 1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc(y_desc)
            .x_labels(rows.len().min(60))
            .x_label_style(
                ("sans-serif", 12)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) if *i < rows.len() => {
                    rows[*i].key.clone()
                }
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(rows.iter().enumerate().map(|(i, row)| {
            let color = Self::ramp(row.count as f64 / peak as f64);
            Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0),
                    (SegmentValue::Exact(i + 1), row.count),
                ],
                color.filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    /// Horizontal bars keyed by country code, color-ramped by count.
    ///
    /// Stand-in for a choropleth: same data shape and color encoding, no
    /// basemap.
    pub fn country_ramp_chart(path: &Path, title: &str, rows: &[CountRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let root = BitMapBackend::new(path, (1000, 720)).into_drawing_area();
        root.fill(&WHITE)?;

        let peak = rows.iter().map(|r| r.count).max().unwrap_or(1).max(1);
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 32))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0u32..peak + peak / 10 + 1, (0..rows.len()).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc("Number of Launches")
            .y_labels(rows.len().min(40))
            .y_label_formatter(&|y| match y {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) if *i < rows.len() => {
                    rows[*i].key.clone()
                }
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(rows.iter().enumerate().map(|(i, row)| {
            let color = Self::ramp(row.count as f64 / peak as f64);
            Rectangle::new(
                [
                    (0, SegmentValue::Exact(i)),
                    (row.count, SegmentValue::Exact(i + 1)),
                ],
                color.filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    /// Histogram of a value distribution, y axis in percent of records.
    pub fn histogram(
        path: &Path,
        title: &str,
        x_desc: &str,
        values: &[f64],
        bins: usize,
    ) -> Result<()> {
        if values.is_empty() || bins == 0 {
            return Ok(());
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let span = if max > min { max - min } else { 1.0 };
        let bin_width = span / bins as f64;

        let mut counts = vec![0u32; bins];
        for &v in values {
            let idx = (((v - min) / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let total = values.len() as f64;
        let peak_pct = counts
            .iter()
            .map(|&c| c as f64 * 100.0 / total)
            .fold(0.0, f64::max);

        let root = BitMapBackend::new(path, (1280, 720)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 32))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(min..min + span, 0.0..peak_pct * 1.1)?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc("% of Missions")
            .draw()?;

        chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let lo = min + i as f64 * bin_width;
            let hi = lo + bin_width;
            Rectangle::new(
                [(lo, 0.0), (hi, count as f64 * 100.0 / total)],
                ACCENT.mix(0.8).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    /// Multi-series line chart over years.
    pub fn line_chart(
        path: &Path,
        title: &str,
        y_desc: &str,
        series: &[(String, Vec<(i32, f64)>)],
    ) -> Result<()> {
        let points: Vec<(i32, f64)> = series.iter().flat_map(|(_, p)| p.iter().copied()).collect();
        if points.is_empty() {
            return Ok(());
        }

        let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
        let x_max = points.iter().map(|p| p.0).max().unwrap_or(1);
        let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max);

        let root = BitMapBackend::new(path, (1280, 720)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 32))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max + 1, 0.0..y_max * 1.1 + 1.0)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(y_desc)
            .x_label_formatter(&|year| year.to_string())
            .draw()?;

        for (i, (name, data)) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            chart
                .draw_series(LineSeries::new(
                    data.iter().copied(),
                    color.stroke_width(2),
                ))?
                .label(name.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 14, y)], color.stroke_width(2))
                });
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }

    /// Launches per year-month slot with a rolling-average overlay.
    pub fn monthly_chart(
        path: &Path,
        title: &str,
        slots: &[MonthSlot],
        rolling: &[Option<f64>],
        window: usize,
    ) -> Result<()> {
        if slots.is_empty() {
            return Ok(());
        }

        let peak = slots.iter().map(|s| s.count).max().unwrap_or(1).max(1) as f64;

        let root = BitMapBackend::new(path, (1400, 720)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 32))
            .margin(15)
            .x_label_area_size(70)
            .y_label_area_size(70)
            .build_cartesian_2d(0..slots.len(), 0.0..peak * 1.1)?;

        chart
            .configure_mesh()
            .x_desc("Month")
            .y_desc("Number of Launches")
            .x_labels(14)
            .x_label_style(
                ("sans-serif", 12)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_label_formatter(&|i| {
                slots
                    .get(*i)
                    .map(|s| format!("{}-{:02}", s.year, s.month))
                    .unwrap_or_default()
            })
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                slots.iter().enumerate().map(|(i, s)| (i, s.count as f64)),
                ACCENT.mix(0.6).stroke_width(1),
            ))?
            .label("Monthly launches")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 14, y)], ACCENT));

        chart
            .draw_series(LineSeries::new(
                rolling
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|v| (i, v))),
                FAILURE_RED.stroke_width(3),
            ))?
            .label(format!("{window}-month rolling average"))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 14, y)], FAILURE_RED.stroke_width(3))
            });

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// Launches over time for the top organisations.
    pub fn organisation_series_chart(
        path: &Path,
        title: &str,
        series: &[OrgSeries],
    ) -> Result<()> {
        let line_series: Vec<(String, Vec<(i32, f64)>)> = series
            .iter()
            .map(|s| {
                (
                    s.organisation.clone(),
                    s.points
                        .iter()
                        .map(|p| (p.year, p.count as f64))
                        .collect(),
                )
            })
            .collect();
        Self::line_chart(path, title, "Number of Launches", &line_series)
    }

    /// Pie chart; slice labels carry the share in percent.
    pub fn pie_chart(path: &Path, title: &str, slices: &[(String, f64)]) -> Result<()> {
        let total: f64 = slices.iter().map(|(_, v)| v).sum();
        if total <= 0.0 {
            return Ok(());
        }

        let (width, height) = (900u32, 760u32);
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        Self::draw_centered_title(&root, title, width)?;

        let center = (width as i32 / 2, height as i32 / 2 + 20);
        let radius = 270.0;

        let mut angle = -PI / 2.0;
        for (i, (label, value)) in slices.iter().enumerate() {
            let sweep = value / total * TAU;
            let sector = Self::annular_sector(center, 0.0, radius, angle, angle + sweep);
            root.draw(&Polygon::new(sector, PALETTE[i % PALETTE.len()].filled()))?;

            let mid = angle + sweep / 2.0;
            let label_pos = Self::polar(center, radius + 40.0, mid);
            let style = TextStyle::from(("sans-serif", 18).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            root.draw(&Text::new(
                format!("{} ({:.1}%)", label, value / total * 100.0),
                label_pos,
                style,
            ))?;

            angle += sweep;
        }

        root.present()?;
        Ok(())
    }

    /// Three-ring sunburst: country, organisation within country, mission
    /// status within organisation. Angular spans nest exactly; leaf counts
    /// sum to the full circle.
    pub fn sunburst_chart(path: &Path, title: &str, rows: &[SunburstRow]) -> Result<()> {
        let total: u64 = rows.iter().map(|r| r.count as u64).sum();
        if total == 0 {
            return Ok(());
        }

        let (width, height) = (1100u32, 1100u32);
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        Self::draw_centered_title(&root, title, width)?;

        let center = (width as i32 / 2, height as i32 / 2 + 20);
        let rings = [70.0, 190.0, 310.0, 430.0];

        // rows arrive sorted by (country, organisation, status); group them
        // into the nested hierarchy, countries ordered by launch volume.
        let mut countries: Vec<(&str, Vec<&SunburstRow>, u64)> = Vec::new();
        for row in rows {
            match countries.last_mut() {
                Some((country, leaves, count)) if *country == row.country => {
                    leaves.push(row);
                    *count += row.count as u64;
                }
                _ => countries.push((&row.country, vec![row], row.count as u64)),
            }
        }
        countries.sort_by(|a, b| b.2.cmp(&a.2));

        let mut angle = -PI / 2.0;
        for (ci, (country, leaves, country_count)) in countries.iter().enumerate() {
            let country_color = PALETTE[ci % PALETTE.len()];
            let country_sweep = *country_count as f64 / total as f64 * TAU;
            root.draw(&Polygon::new(
                Self::annular_sector(center, rings[0], rings[1], angle, angle + country_sweep),
                country_color.filled(),
            ))?;

            if country_sweep > 0.12 {
                let label_pos =
                    Self::polar(center, (rings[0] + rings[1]) / 2.0, angle + country_sweep / 2.0);
                let style = TextStyle::from(("sans-serif", 16).into_font())
                    .color(&WHITE)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                root.draw(&Text::new(country.to_string(), label_pos, style))?;
            }

            // middle ring: organisations, alternating shade of the country hue
            let mut org_angle = angle;
            let mut org_index = 0usize;
            let mut li = 0;
            while li < leaves.len() {
                let organisation = &leaves[li].organisation;
                let mut org_count = 0u64;
                let org_start = li;
                while li < leaves.len() && &leaves[li].organisation == organisation {
                    org_count += leaves[li].count as u64;
                    li += 1;
                }

                let org_sweep = org_count as f64 / total as f64 * TAU;
                let shade = if org_index % 2 == 0 { 0.75 } else { 0.5 };
                root.draw(&Polygon::new(
                    Self::annular_sector(center, rings[1], rings[2], org_angle, org_angle + org_sweep),
                    country_color.mix(shade).filled(),
                ))?;

                // outer ring: mission status leaves
                let mut status_angle = org_angle;
                for leaf in &leaves[org_start..li] {
                    let status_sweep = leaf.count as f64 / total as f64 * TAU;
                    root.draw(&Polygon::new(
                        Self::annular_sector(
                            center,
                            rings[2],
                            rings[3],
                            status_angle,
                            status_angle + status_sweep,
                        ),
                        Self::status_color(&leaf.status).mix(0.85).filled(),
                    ))?;
                    status_angle += status_sweep;
                }

                org_angle += org_sweep;
                org_index += 1;
            }

            angle += country_sweep;
        }

        root.present()?;
        Ok(())
    }

    fn status_color(status: &str) -> RGBColor {
        match status {
            "Success" => SUCCESS_GREEN,
            "Partial Failure" => PARTIAL_ORANGE,
            _ => FAILURE_RED,
        }
    }

    fn draw_centered_title(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        width: u32,
    ) -> Result<()> {
        let style = TextStyle::from(("sans-serif", 32).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(title.to_string(), (width as i32 / 2, 15), style))?;
        Ok(())
    }

    /// Sequential light-to-dark ramp used where the original design had a
    /// continuous color scale.
    fn ramp(t: f64) -> RGBColor {
        let t = t.clamp(0.0, 1.0);
        let lo = (255.0, 237.0, 160.0);
        let hi = (189.0, 0.0, 38.0);
        RGBColor(
            (lo.0 + (hi.0 - lo.0) * t) as u8,
            (lo.1 + (hi.1 - lo.1) * t) as u8,
            (lo.2 + (hi.2 - lo.2) * t) as u8,
        )
    }

    fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
        (
            center.0 + (radius * angle.cos()).round() as i32,
            center.1 + (radius * angle.sin()).round() as i32,
        )
    }

    /// Vertex list of an annular sector (a full sector when `r_inner` is 0).
    fn annular_sector(
        center: (i32, i32),
        r_inner: f64,
        r_outer: f64,
        a_start: f64,
        a_end: f64,
    ) -> Vec<(i32, i32)> {
        let steps = (((a_end - a_start).abs() / 0.02).ceil() as usize).max(2);
        let mut points = Vec::with_capacity(steps * 2 + 2);

        for s in 0..=steps {
            let a = a_start + (a_end - a_start) * s as f64 / steps as f64;
            points.push(Self::polar(center, r_outer, a));
        }
        if r_inner <= 0.0 {
            points.push(center);
        } else {
            for s in (0..=steps).rev() {
                let a = a_start + (a_end - a_start) * s as f64 / steps as f64;
                points.push(Self::polar(center, r_inner, a));
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ChartRenderer::ramp(0.0), RGBColor(255, 237, 160));
        assert_eq!(ChartRenderer::ramp(1.0), RGBColor(189, 0, 38));
    }

    #[test]
    fn test_annular_sector_closes_on_center_for_pie() {
        let points = ChartRenderer::annular_sector((0, 0), 0.0, 10.0, 0.0, PI / 2.0);
        assert_eq!(points.last(), Some(&(0, 0)));
        assert_eq!(points.first(), Some(&(10, 0)));
    }

    #[test]
    fn test_annular_sector_has_inner_arc() {
        let points = ChartRenderer::annular_sector((0, 0), 5.0, 10.0, 0.0, PI);
        // Outer arc start and inner arc end both sit on the x axis.
        assert_eq!(points.first(), Some(&(10, 0)));
        assert_eq!(points.last(), Some(&(5, 0)));
    }

    #[test]
    fn test_status_colors_distinguish_outcomes() {
        assert_eq!(ChartRenderer::status_color("Success"), SUCCESS_GREEN);
        assert_eq!(ChartRenderer::status_color("Partial Failure"), PARTIAL_ORANGE);
        assert_eq!(ChartRenderer::status_color("Prelaunch Failure"), FAILURE_RED);
        assert_eq!(ChartRenderer::status_color("Failure"), FAILURE_RED);
    }
}
