//! Test fixtures: catalog rows and generated images.

use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;

pub const CATALOG_HEADER: &str = "productname,price,category,weight,brand,itempackagequantity,packageinformation,manufacturer,countryoforigin";

pub const APPLE_ROW: &str = "Apple,1.50,Fruit,1kg,Farm,6,Bag,FarmCo,USA";

pub fn catalog_csv(rows: &[&str]) -> String {
    let mut csv = String::from(CATALOG_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

pub fn grocery(name: &str, price: Value) -> Value {
    json!({
        "productname": name,
        "price": price,
        "category": "Fruit",
        "weight": "1kg",
        "brand": "Farm",
        "itempackagequantity": 6,
        "packageinformation": "Bag",
        "manufacturer": "FarmCo",
        "countryoforigin": "USA"
    })
}

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode fixture image");
    out.into_inner()
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128])),
        ImageFormat::Jpeg,
    )
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(
        RgbImage::from_pixel(width, height, Rgb([10, 200, 30])),
        ImageFormat::Png,
    )
}
