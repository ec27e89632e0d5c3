//! Built-in dataset used when no snapshot file exists yet.

use super::{Locations, PatientRecord, Snapshot};

const DECEASED: &[&str] = &[
    "Andrés Pichardo",
    "Aneuris Viña",
    "Carolina Pérez Flores",
    "Cheila Berroa",
    "Daniel Taveras Polanco",
    "Diego Armando Severino",
    "Élva Gálvez",
    "Génesis de León",
    "Héctor Bienvenido Peguero Ramírez",
    "Indira Disla Méndez",
    "Lorenzo Ricardo",
    "Lourdes Ricard",
    "Luis Emilio Solís",
    "María Isabel Guerrero",
    "Nelsy Milagros Cruz",
    "Nidia Carolina Solano",
    "Paulino Lorenzo",
    "Pedro Cepeda",
    "Ramón Alberto Santana Benítez",
    "Randy Alexander Rodríguez",
    "Vianka Reyes",
    "Julio Cesar Valera",
    "Aracelis Rodríguez",
    "Cesar López Gronell",
    "Desnaud Wilmord",
    "Fray Luis Rosario",
    "Isabel Betania Cabrera",
    "Miguel Ángel Pérez Suarez",
    "Nelsida Sánchez",
    "Ruth Delania Santana",
    "Tony Enrique Blanco Cabrera",
    "Yaris Francisco Holguin Arias",
];

type SeedLocation = (&'static str, &'static [(&'static str, Option<u32>)]);

const PATIENTS: &[SeedLocation] = &[
    (
        "Hospital Darío Contreras",
        &[
            ("Giselle Guerrero", Some(35)),
            ("Pedro Espinal", None),
            ("Ruddy Alonzo", Some(44)),
            ("Viviana Díaz", Some(34)),
            ("Marisol Chalas", Some(58)),
            ("Pamela Montoya", Some(33)),
            ("Douglas García", Some(42)),
            ("Carlos Martínez", Some(42)),
            ("Carolina Rodríguez", Some(43)),
            ("Elianta Quintero", None),
            ("José Candelario", Some(55)),
            ("Jonathan Natera", None),
            ("Katherine Coronado", None),
            ("Lucía Castilla", Some(43)),
            ("Ingrid Reyes", Some(64)),
            ("Giselle Ogando", None),
            ("Víctor de la Cruz", Some(67)),
            ("Martin Bautista", Some(50)),
            ("Simeón Mueses", Some(42)),
            ("Manuela Vólquez", None),
            ("Evelin Mariela Navarro de León", Some(35)),
        ],
    ),
    (
        "Hospital Marcelino Vélez Santana",
        &[
            ("Milagros Acosta", Some(27)),
            ("Christian Marques", Some(40)),
            ("Marla Urbáez", Some(21)),
            ("Karla Sánchez", Some(31)),
            ("Ricardo Archstore Lir", None),
            ("Juliana V. Castillo Vargas", None),
            ("Ivelisse Reynoso", Some(53)),
            ("Ricardo Gilbert Julián", Some(59)),
            ("Jorge Santana", None),
            ("Brenda Ortega", None),
        ],
    ),
    (
        "Hospital Vinicio Calventi",
        &[("Víctor Manuel de la Cruz", Some(67))],
    ),
    (
        "Hospital Ney Arias Lora",
        &[
            ("Kevin Patricio", Some(42)),
            ("Elena Almánzar", Some(49)),
            ("Danilda Amado Figueroa", Some(31)),
            ("Héctor Brito", Some(34)),
            ("Jesús Ramírez", Some(35)),
            ("Dominicana Acosta", Some(48)),
            ("Feliz Manuel Soto", Some(53)),
            ("Elsa Espinal Arias", Some(31)),
            ("Rosbely Pérez", Some(45)),
            ("Ana Montero", Some(32)),
            ("Juan Arturo Soto", Some(48)),
            ("Germán Jorge", Some(38)),
            ("Geraldine Bastardo", Some(37)),
            ("José Abreu Santana", Some(26)),
            ("Gilberto Encarnación", Some(36)),
            ("Jenine Mena", Some(40)),
            ("Luis Alberto Saavedra", Some(56)),
            ("Alba Montero", Some(33)),
            ("Victor Manuel Rodríguez", Some(31)),
            ("Anny Montero", None),
            ("Lenin Manuel Díaz", None),
            ("Félix Soto", Some(53)),
            ("Moisés Torres Pión", Some(31)),
            ("Francisco Aurelio Martínez", Some(44)),
            ("Alba María Rojas", Some(44)),
            ("Danilda Figueroa", Some(29)),
        ],
    ),
    ("Hospital Moscoso Puello", &[("Yaitza Marín", Some(56))]),
    (
        "Hospital Salvador B. Gautier",
        &[
            ("Jennifer Taveras", Some(24)),
            ("Carlos Rolando Cepín Martínez", Some(38)),
            ("Bartolo Reyes", Some(55)),
        ],
    ),
];

/// The initial dataset, in its original order.
pub fn snapshot() -> Snapshot {
    let mut patients = Locations::new();
    for (location, records) in PATIENTS {
        for (name, age) in records.iter() {
            patients.push(
                location,
                PatientRecord {
                    name: name.to_string(),
                    age: *age,
                },
            );
        }
    }

    Snapshot {
        deceased: DECEASED.iter().map(|name| name.to_string()).collect(),
        patients,
    }
}
