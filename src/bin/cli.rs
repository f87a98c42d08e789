use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use worldgen::city::{City, Owner};
use worldgen::continent::ContinentTable;
use worldgen::{GenParams, generate_world, preview};

/// Генератор мира для Iron Tide
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид генерации (перекрывает конфиг)
    #[arg(long)]
    seed: Option<u64>,

    /// Процент воды на карте, 10..=90
    #[arg(short, long)]
    water: Option<u32>,

    /// Число проходов сглаживания рельефа
    #[arg(short, long)]
    smooth: Option<u32>,

    /// Число игроков, 1..=4
    #[arg(short, long)]
    players: Option<u32>,

    /// Число городов
    #[arg(long)]
    cities: Option<u32>,

    /// Прямоугольная детерминированная карта с рассадкой по углам
    #[arg(long)]
    box_map: bool,

    /// Режим самоигры: стартовое производство назначается сразу
    #[arg(long)]
    sim: bool,

    /// Сторона блока клетки в превью, в пикселях
    #[arg(long, default_value_t = 8)]
    scale: u32,

    /// Каталог для артефактов (по умолчанию: ./out)
    #[arg(short, long, default_value = "out")]
    output: PathBuf,
}

/// Срез мира для экспорта в JSON: то, что потребляют внешние подсистемы.
#[derive(Serialize)]
struct WorldExport<'a> {
    width: u32,
    height: u32,
    attempts: u32,
    cities: &'a [City],
    continents: &'a ContinentTable,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut params = match &cli.config {
        Some(path) => GenParams::from_toml_file(path.to_str().ok_or("некорректный путь")?)?,
        None => GenParams::default(),
    };
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }
    if let Some(water) = cli.water {
        params.water_ratio = water;
    }
    if let Some(smooth) = cli.smooth {
        params.smooth = smooth;
    }
    if let Some(players) = cli.players {
        params.num_players = players;
    }
    if let Some(cities) = cli.cities {
        params.num_cities = cities;
    }
    if cli.box_map {
        params.box_map = true;
    }
    if cli.sim {
        params.sim_mode = true;
    }

    println!(
        "Генерация мира {}×{} (сид {}, воды {}%)...",
        params.width, params.height, params.seed, params.water_ratio
    );
    let world = generate_world(&params)?;
    println!(
        "Готово за {} попыток: городов {}, континентов {}.",
        world.attempts,
        world.cities.len(),
        world.continents.conts.len()
    );

    println!("\nКонтиненты по рангу:");
    for (place, &ci) in world.continents.rank.iter().enumerate() {
        let c = &world.continents.conts[ci];
        println!(
            "  {:>2}. ценность {:>6}  городов {:>2}  портов {:>2}  суши {:>4}",
            place + 1,
            c.value,
            c.cities.len(),
            c.shore,
            c.land
        );
    }

    println!("\nСтартовые города:");
    for city in &world.cities {
        if let Owner::Player(p) = city.owner {
            println!(
                "  игрок {}: клетка {} (строка {}, столбец {})",
                p + 1,
                city.loc,
                world.grid.row(city.loc),
                world.grid.col(city.loc)
            );
        }
    }

    std::fs::create_dir_all(&cli.output)?;

    let terrain_path = cli.output.join("terrain.png");
    preview::save_world_png(
        &world.grid,
        &world.cities,
        cli.scale,
        terrain_path.to_str().ok_or("некорректный путь")?,
    )?;

    if let Some(field) = &world.height {
        let height_path = cli.output.join("height.png");
        field.save_as_png(height_path.to_str().ok_or("некорректный путь")?)?;
    }

    let export = WorldExport {
        width: world.grid.width,
        height: world.grid.height,
        attempts: world.attempts,
        cities: &world.cities,
        continents: &world.continents,
    };
    std::fs::write(
        cli.output.join("world.json"),
        serde_json::to_string_pretty(&export)?,
    )?;

    println!("\nАртефакты сохранены в {:?}", cli.output);
    Ok(())
}
