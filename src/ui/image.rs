//! Half-block image renderer.
//!
//! Each terminal cell shows two vertical pixels using `▀`: the foreground
//! colour is the top pixel, the background colour the bottom one.

use image::imageops::FilterType;
use ratatui::{buffer::Buffer, layout::Position, layout::Rect, style::Color};

/// Render rows `skip..skip + area.height` of `img` stretched to
/// `area.width × full_rows` cells.  Only the source rows behind the visible
/// window are resampled, so a tall image scrolled into view costs no more
/// than a short one.
pub fn render_halfblocks(
    img: &image::RgbaImage,
    full_rows: u16,
    skip: u16,
    area: Rect,
    buf: &mut Buffer,
) {
    if area.width == 0 || area.height == 0 || img.width() == 0 || img.height() == 0 {
        return;
    }
    let full_px = full_rows.max(1) as f64 * 2.0;
    let end = skip.saturating_add(area.height).min(full_rows.max(1));
    if end <= skip {
        return;
    }
    let rows = end - skip;

    // Source rows covering [skip, end) in cell space.
    let src_h = img.height() as f64;
    let y0 = ((skip as f64 * 2.0 / full_px) * src_h).floor() as u32;
    let y1 = ((end as f64 * 2.0 / full_px) * src_h).ceil() as u32;
    let y0 = y0.min(img.height() - 1);
    let h = y1.clamp(y0 + 1, img.height()) - y0;

    let window = image::imageops::crop_imm(img, 0, y0, img.width(), h).to_image();
    let rgba = image::imageops::resize(&window, area.width as u32, rows as u32 * 2, FilterType::Triangle);

    for row in 0..rows {
        let yt = row as u32 * 2;
        let yb = yt + 1;
        for col in 0..area.width {
            let t = rgba.get_pixel(col as u32, yt);
            let b = rgba.get_pixel(col as u32, yb);
            if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                cell.set_char('▀')
                    .set_fg(Color::Rgb(t[0], t[1], t[2]))
                    .set_bg(Color::Rgb(b[0], b[1], b[2]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_tone_image_maps_to_fg_and_bg() {
        let mut img = image::RgbaImage::new(4, 4);
        for (_, y, px) in img.enumerate_pixels_mut() {
            *px = if y < 2 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            };
        }

        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        render_halfblocks(&img, 2, 0, area, &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), "▀");
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(3, 1)].bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn empty_area_is_a_no_op() {
        let img = image::RgbaImage::new(2, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
        render_halfblocks(&img, 4, 0, Rect::new(0, 0, 0, 0), &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn window_samples_only_the_visible_slice() {
        // Top half red, bottom half blue.
        let mut img = image::RgbaImage::new(2, 100);
        for (_, y, px) in img.enumerate_pixels_mut() {
            *px = if y < 50 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            };
        }

        // 40 rows in total; show 3 rows starting deep in the blue half.
        let area = Rect::new(0, 0, 2, 3);
        let mut buf = Buffer::empty(area);
        render_halfblocks(&img, 40, 30, area, &mut buf);

        for y in 0..3 {
            assert_eq!(buf[(0, y)].symbol(), "▀");
            assert_eq!(buf[(1, y)].fg, Color::Rgb(0, 0, 255));
        }
    }

    #[test]
    fn window_past_the_end_is_clipped() {
        let img = image::RgbaImage::new(2, 2);
        let area = Rect::new(0, 0, 2, 4);
        let mut buf = Buffer::empty(area);
        render_halfblocks(&img, 3, 1, area, &mut buf);

        assert_eq!(buf[(0, 1)].symbol(), "▀");
        assert_eq!(buf[(0, 2)].symbol(), " ");
    }
}
