use serde::{Deserialize, Serialize};
use csv_marshal::{
    encoder::Encoder,
    sink::csv::{Terminator, csv_writer::CsvRowWriterBuilder},
    to_string, to_writer, to_writer_without_headers,
};

#[derive(Serialize, Deserialize, Clone)]
struct Item {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Tag,omitempty")]
    tag: String,
}

fn item(name: &str, tag: &str) -> Item {
    Item {
        name: name.to_string(),
        tag: tag.to_string(),
    }
}

#[derive(Serialize, Deserialize)]
struct Manufacturer {
    country: String,
    name: String,
    #[serde(rename = "founded,omitempty")]
    founded: Option<i32>,
}

#[derive(Serialize, Deserialize)]
struct Product {
    id: String,
    name: String,
    price: f64,
    #[serde(rename = "description,omitempty")]
    description: Option<String>,
    available: bool,
    manufacturer: Manufacturer,
    #[serde(rename = "-")]
    internal_code: u32,
}

fn products() -> Vec<Product> {
    vec![
        Product {
            id: "P001".to_string(),
            name: "Wireless Headphones".to_string(),
            price: 79.99,
            description: Some("Noise-cancelling, 20hr battery".to_string()),
            available: true,
            manufacturer: Manufacturer {
                country: "Japan".to_string(),
                name: "Sony".to_string(),
                founded: None,
            },
            internal_code: 17,
        },
        Product {
            id: "P002".to_string(),
            name: "USB-C Cable".to_string(),
            price: 12.5,
            description: None,
            available: false,
            manufacturer: Manufacturer {
                country: "China".to_string(),
                name: "Anker".to_string(),
                founded: None,
            },
            internal_code: 18,
        },
    ]
}

#[test]
fn fully_empty_omitempty_column_is_dropped() {
    let csv = to_string(&vec![item("A", ""), item("B", "")]).unwrap();
    assert_eq!(csv, "Name\nA\nB\n");
}

#[test]
fn partially_empty_omitempty_column_is_kept() {
    let csv = to_string(&vec![item("A", ""), item("B", "x")]).unwrap();
    assert_eq!(csv, "Name,Tag\nA,\nB,x\n");
}

#[test]
fn nested_structs_are_flattened_and_empty_columns_omitted() {
    let csv = to_string(&products()).unwrap();

    assert_eq!(
        csv,
        "id,name,price,description,available,manufacturer.country,manufacturer.name
P001,Wireless Headphones,79.99,\"Noise-cancelling, 20hr battery\",true,Japan,Sony
P002,USB-C Cable,12.5,,false,China,Anker
"
    );
}

#[test]
fn header_and_rows_have_the_same_width() {
    let mut rows: Vec<Vec<String>> = Vec::new();
    Encoder::new(&mut rows)
        .encode_all(&products(), false)
        .unwrap();

    let width = rows[0].len();
    assert_eq!(width, 7);
    assert!(rows.iter().all(|row| row.len() == width));
}

#[test]
fn records_behind_options_and_smart_pointers_are_encoded() {
    let options = vec![Some(item("A", "t"))];
    assert_eq!(to_string(&options).unwrap(), "Name,Tag\nA,t\n");

    let (a, b) = (item("A", "t"), item("B", ""));
    let borrowed = vec![&a, &b];
    let mut rows: Vec<Vec<String>> = Vec::new();
    Encoder::new(&mut rows).encode_all(&borrowed, false).unwrap();
    assert_eq!(rows, vec![vec!["Name", "Tag"], vec!["A", "t"], vec!["B", ""]]);

    let boxed: Box<[Item]> = vec![item("C", "")].into_boxed_slice();
    assert_eq!(to_string(&boxed).unwrap(), "Name\nC\n");
}

#[test]
fn arrays_and_slices_are_encoded() {
    let array = [item("A", "x"), item("B", "y")];
    assert_eq!(to_string(&array).unwrap(), "Name,Tag\nA,x\nB,y\n");
    assert_eq!(to_string(&array[1..]).unwrap(), "Name,Tag\nB,y\n");
}

#[test]
fn headers_can_be_omitted() {
    let mut buffer = Vec::new();
    to_writer_without_headers(&vec![item("A", "x")], &mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), "A,x\n");
}

#[test]
fn writing_to_an_io_writer() {
    let mut buffer = Vec::new();
    to_writer(&vec![item("A", "x")], &mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), "Name,Tag\nA,x\n");
}

#[test]
fn sink_dialect_is_configurable() {
    let mut writer = CsvRowWriterBuilder::new()
        .delimiter(b'|')
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    Encoder::new(&mut writer)
        .encode_all(&vec![item("A", "x|y")], false)
        .unwrap();

    let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(data, "Name|Tag\r\nA|\"x|y\"\r\n");
}

#[test]
fn aliases_use_the_first_key_as_header() {
    #[derive(Serialize, Deserialize)]
    struct Aliased {
        #[serde(rename = "id|identifier|key")]
        id: u64,
        #[serde(rename = ",inline")]
        item: Item,
    }

    let records = vec![Aliased {
        id: 7,
        item: item("A", ""),
    }];
    assert_eq!(to_string(&records).unwrap(), "id,Name\n7,A\n");
}

#[test]
fn unit_enums_and_display_types_are_written_as_text() {
    #[derive(Serialize, Deserialize)]
    enum Status {
        Active,
        #[serde(rename = "on-hold")]
        OnHold,
    }

    #[derive(Serialize, Deserialize)]
    struct Account {
        status: Status,
        address: std::net::Ipv4Addr,
        balance: i64,
    }

    let records = vec![
        Account {
            status: Status::Active,
            address: std::net::Ipv4Addr::LOCALHOST,
            balance: -20,
        },
        Account {
            status: Status::OnHold,
            address: std::net::Ipv4Addr::new(10, 0, 0, 1),
            balance: 0,
        },
    ];

    assert_eq!(
        to_string(&records).unwrap(),
        "status,address,balance\nActive,127.0.0.1,-20\non-hold,10.0.0.1,0\n"
    );
}

#[test]
fn an_empty_slice_is_written_as_a_header() {
    assert_eq!(to_string(&Vec::<Item>::new()).unwrap(), "Name\n");
    assert_eq!(to_string(&Vec::<Product>::new()).unwrap().lines().count(), 1);
}

#[derive(Serialize, Deserialize)]
struct Office {
    name: String,
    #[serde(rename = "hq")]
    headquarters: Option<Manufacturer>,
}

fn office(name: &str, country: Option<&str>) -> Office {
    Office {
        name: name.to_string(),
        headquarters: country.map(|country| Manufacturer {
            country: country.to_string(),
            name: "Acme".to_string(),
            founded: None,
        }),
    }
}

#[test]
fn nested_records_missing_from_the_first_row_are_encoded() {
    let expected = "name,hq.country,hq.name\nLyon,,\nOslo,Norway,Acme\n";
    assert_eq!(
        to_string(&[office("Lyon", None), office("Oslo", Some("Norway"))]).unwrap(),
        expected
    );

    let mut rows: Vec<Vec<String>> = Vec::new();
    Encoder::new(&mut rows)
        .encode_all(&vec![office("Oslo", Some("Norway")), office("Lyon", None)], false)
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec!["name", "hq.country", "hq.name"],
            vec!["Oslo", "Norway", "Acme"],
            vec!["Lyon", "", ""],
        ]
    );
}
