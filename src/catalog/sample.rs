// Built-in artist dataset shipped with the game.
// Listener counts are Spotify monthly listeners at the time of capture.

/// (name, monthly listeners, image path relative to the game root)
pub const SAMPLE_ARTISTS: &[(&str, u64, &str)] = &[
    ("Zell", 585554, "img/img_artista/zell.png"),
    ("afkGOAT", 14269, "img/img_artista/afkgoat.png"),
    ("lolo", 125645, "img/img_artista/lolo.png"),
    ("turrobaby", 505169, "img/img_artista/turrobaby.png"),
    ("Little Boogie", 269709, "img/img_artista/littleboogie.png"),
    ("Stiffy", 307888, "img/img_artista/stiffy.png"),
    ("AgusFortnite2008", 240471, "img/img_artista/agusfortnite2008.png"),
    ("Frozouda", 228098, "img/img_artista/frozouda.png"),
    ("cero*", 185201, "img/img_artista/cero.png"),
    ("Knak", 468193, "img/img_artista/knak.png"),
    ("pabloxo", 72252, "img/img_artista/pabloxo.png"),
    ("SixUp", 41424, "img/img_artista/sixup.png"),
    ("tuw4", 79141, "img/img_artista/tuw4.png"),
    ("shako", 120555, "img/img_artista/shako.png"),
    ("Jugo!", 207687, "img/img_artista/jugo.png"),
    ("Blagh", 84473, "img/img_artista/blagh.png"),
    ("magnesio", 23188, "img/img_artista/magnesio.png"),
    ("Clúster", 400114, "img/img_artista/cluster.png"),
    ("Cosmic Kid", 570154, "img/img_artista/cosmickid.png"),
    ("Ze pequeña", 13902, "img/img_artista/zepequena.png"),
    ("laura sad", 33338, "img/img_artista/laurasad.png"),
    ("Kerchak", 18903, "img/img_artista/kerchak.png"),
    ("enzocerobulto", 130997, "img/img_artista/enzocerobulto.png"),
    ("Dagger", 26126, "img/img_artista/dagger.png"),
    ("isma", 17984, "img/img_artista/isma.png"),
    ("Doly flackko", 207635, "img/img_artista/dolyflackko.png"),
    ("pa2k", 80568, "img/img_artista/pa2k.png"),
    ("143leti", 40691, "img/img_artista/143leti.png"),
    ("elaiyah", 69618, "img/img_artista/elaiyah.png"),
    ("Choosey", 57552, "img/img_artista/choosey.png"),
    ("White!", 3930, "img/img_artista/white.png"),
    ("pankky", 54045, "img/img_artista/pankky.png"),
    ("vahel", 10854, "img/img_artista/vahel.png"),
    ("jovenalien", 3476, "img/img_artista/jovenalien.png"),
    ("Hellolola", 128421, "img/img_artista/hellolola.png"),
    ("2uu!", 82735, "img/img_artista/2uu.png"),
    ("bbtrickz", 2646718, "img/img_artista/bbtrickz.png"),
    ("Rojuu", 846565, "img/img_artista/rojuu.png"),
    ("underaiki", 128804, "img/img_artista/underaiki.png"),
    ("Hwii", 38997, "img/img_artista/hwii.png"),
    ("cybernene", 218452, "img/img_artista/cybernene.png"),
    ("Red Shine", 11689, "img/img_artista/redshine.png"),
    ("Matiasenchufe", 16708, "img/img_artista/matiasenchufe.png"),
    ("Playboi Carti", 47823637, "img/img_artista/playboicarti.png"),
    ("salas flaco", 102859, "img/img_artista/salasflaco.png"),
    ("cowmelek", 28369, "img/img_artista/cowmelek.png"),
    ("huntr", 50762, "img/img_artista/huntr.png"),
    ("Nachotheplug", 18930, "img/img_artista/nachotheplug.png"),
    ("Ramma", 874840, "img/img_artista/ramma.png"),
    ("Hepa", 21849, "img/img_artista/hepa.png"),
    ("agusdelusion", 2901, "img/img_artista/agusdelusion.png"),
    ("Agush", 26352, "img/img_artista/agush.png"),
    ("bic", 35661, "img/img_artista/bic.png"),
    ("nykoo0", 11817, "img/img_artista/nykoo0.png"),
    ("Francis Jeremy", 7201, "img/img_artista/francisjeremy.png"),
    ("Banatroll", 2180, "img/img_artista/banatroll.png"),
    ("Saramalacara", 634738, "img/img_artista/saramalacara.png"),
    ("PanchitoLeFleur", 15816, "img/img_artista/panchitolefleur.png"),
    ("Joshu joshu", 38977, "img/img_artista/joshujoshu.png"),
];
